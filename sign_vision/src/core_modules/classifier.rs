// THEORY:
// The `classifier` is the decision layer of the engine. It maps one frame's
// finger features to at most one gesture using an ordered cascade of rules.
//
// Key architectural principles:
// 1.  **Ordered Table, First Match Wins**: Each `Rule` pairs a predicate with a
//     label and a fixed confidence. Many predicates overlap (a fist satisfies both
//     "O" and "Yes" depending on the thumb), so precedence is the table order and
//     nothing else. Reordering the table is a behaviour change.
// 2.  **Fixed Confidences**: A rule's confidence is a constant, not a score. Rules
//     for letters with a distinctive finger pattern sit near 0.85; words inferred
//     from a single static frame sit lower.
// 3.  **Static Approximation of Motion**: Signs that really involve movement (J, Z,
//     and most words) are approximated from hand tilt or absolute position in the
//     frame. The position thresholds assume the signer is framed roughly the same
//     way every time.
// 4.  **Shadowed Rules Are Kept**: Some rules can never fire because an earlier rule
//     or the extension test itself already covers every pose they accept. They stay
//     in the table, listed in `SHADOWED`, so the vocabulary and order match the
//     reference behaviour.

use crate::core_modules::finger_state::Finger::{self, *};
use crate::core_modules::finger_state::FingerExtensionState;
use crate::core_modules::gesture::{Gesture, GestureMatch};
use crate::core_modules::landmark::*;

/// Maximum horizontal index/middle tip gap for the fingers to count as "together".
pub const FINGER_GAP_THRESHOLD: f64 = 0.04;

const NON_THUMB: [Finger; 4] = [Index, Middle, Ring, Pinky];

type Predicate = fn(&FingerExtensionState) -> bool;

/// One entry of the cascade.
#[derive(Clone, Copy)]
pub struct Rule {
    pub gesture: Gesture,
    pub confidence: f64,
    predicate: Predicate,
}

impl Rule {
    const fn new(gesture: Gesture, confidence: f64, predicate: Predicate) -> Self {
        Self {
            gesture,
            confidence,
            predicate,
        }
    }

    pub fn matches(&self, hand: &FingerExtensionState) -> bool {
        (self.predicate)(hand)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("gesture", &self.gesture)
            .field("confidence", &self.confidence)
            .finish()
    }
}

/// The full cascade in evaluation order.
pub static CASCADE: [Rule; 30] = [
    // --- Letters ---
    Rule::new(Gesture::A, 0.85, letter_a),
    Rule::new(Gesture::B, 0.85, letter_b),
    Rule::new(Gesture::C, 0.75, letter_c),
    Rule::new(Gesture::D, 0.8, letter_d),
    Rule::new(Gesture::I, 0.85, letter_i),
    Rule::new(Gesture::J, 0.75, letter_j),
    Rule::new(Gesture::L, 0.85, letter_l),
    Rule::new(Gesture::O, 0.8, letter_o),
    Rule::new(Gesture::U, 0.8, letter_u),
    Rule::new(Gesture::V, 0.85, letter_v),
    Rule::new(Gesture::Y, 0.85, letter_y),
    Rule::new(Gesture::Z, 0.75, letter_z),
    // --- Words ---
    Rule::new(Gesture::ILoveYou, 0.9, word_i_love_you),
    Rule::new(Gesture::Hello, 0.8, word_hello),
    Rule::new(Gesture::Yes, 0.6, word_yes),
    Rule::new(Gesture::No, 0.7, word_no),
    Rule::new(Gesture::Please, 0.6, word_please),
    Rule::new(Gesture::Drink, 0.7, word_drink),
    Rule::new(Gesture::Rain, 0.7, word_rain),
    Rule::new(Gesture::Eat, 0.7, word_eat),
    Rule::new(Gesture::Thirsty, 0.7, word_thirsty),
    Rule::new(Gesture::Say, 0.7, word_say),
    Rule::new(Gesture::Maybe, 0.65, word_maybe),
    Rule::new(Gesture::DontKnow, 0.65, word_dont_know),
    Rule::new(Gesture::Forget, 0.65, word_forget),
    Rule::new(Gesture::Walk, 0.7, word_walk),
    Rule::new(Gesture::Shirt, 0.7, word_shirt),
    Rule::new(Gesture::Book, 0.65, word_book),
    Rule::new(Gesture::Look, 0.7, word_look),
    Rule::new(Gesture::How, 0.65, word_how),
];

/// Rules that no pose can reach:
/// - `No` accepts a strict subset of what `U` accepts just above it.
/// - `Drink` and `Shirt` need thumb-only and thumb+index poses, which `A` and `L` take.
/// - `Eat` needs four folded fingers, which `A`, `O` or `Yes` always take first.
/// - `Rain` and `Thirsty` require a finger to be both extended and below its PIP joint.
/// - `Book` is fully covered by the wider `Please` and `Maybe` bands.
pub const SHADOWED: [Gesture; 7] = [
    Gesture::No,
    Gesture::Drink,
    Gesture::Rain,
    Gesture::Eat,
    Gesture::Thirsty,
    Gesture::Shirt,
    Gesture::Book,
];

/// Runs the cascade over one frame's features.
pub fn classify(hand: &FingerExtensionState) -> GestureMatch {
    match CASCADE.iter().find(|rule| rule.matches(hand)) {
        Some(rule) => GestureMatch::new(rule.gesture, rule.confidence),
        None => GestureMatch::none(),
    }
}

/// Classifies an optional frame; no hand means no match.
pub fn classify_frame(hand: Option<&FingerExtensionState>) -> GestureMatch {
    hand.map(classify).unwrap_or_default()
}

fn tip_gap_x(hand: &FingerExtensionState, a: usize, b: usize) -> f64 {
    (hand.point(a).x - hand.point(b).x).abs()
}

fn tip_gap_y(hand: &FingerExtensionState, a: usize, b: usize) -> f64 {
    (hand.point(a).y - hand.point(b).y).abs()
}

fn touching(hand: &FingerExtensionState, a: usize, b: usize, limit: f64) -> bool {
    hand.point(a).manhattan_distance(hand.point(b)) < limit
}

// --- Letters ---

fn letter_a(h: &FingerExtensionState) -> bool {
    h.only(&[Thumb])
}

fn letter_b(h: &FingerExtensionState) -> bool {
    h.only(&NON_THUMB)
}

fn letter_c(h: &FingerExtensionState) -> bool {
    let thumb_index = tip_gap_x(h, THUMB_TIP, INDEX_TIP);
    h.extended_count() >= 3
        && h.point(INDEX_TIP).x < h.point(PINKY_TIP).x + 0.15
        && thumb_index > 0.05
        && thumb_index < 0.15
}

fn letter_d(h: &FingerExtensionState) -> bool {
    h.index && h.folded(&[Middle, Ring, Pinky]) && touching(h, THUMB_TIP, MIDDLE_TIP, 0.1)
}

fn letter_i(h: &FingerExtensionState) -> bool {
    h.only(&[Pinky])
}

fn letter_j(h: &FingerExtensionState) -> bool {
    h.pinky
        && h.folded(&[Index, Middle, Ring])
        && h.point(PINKY_TIP).x < h.point(WRIST).x - 0.05
}

fn letter_l(h: &FingerExtensionState) -> bool {
    h.only(&[Thumb, Index])
}

fn letter_o(h: &FingerExtensionState) -> bool {
    h.folded(&NON_THUMB) && touching(h, THUMB_TIP, INDEX_TIP, 0.08) && !h.thumb
}

fn letter_u(h: &FingerExtensionState) -> bool {
    h.only(&[Index, Middle]) && tip_gap_x(h, INDEX_TIP, MIDDLE_TIP) < FINGER_GAP_THRESHOLD
}

fn letter_v(h: &FingerExtensionState) -> bool {
    h.raised(&[Index, Middle])
        && h.folded(&[Ring, Pinky])
        && tip_gap_x(h, INDEX_TIP, MIDDLE_TIP) > FINGER_GAP_THRESHOLD
}

fn letter_y(h: &FingerExtensionState) -> bool {
    h.only(&[Thumb, Pinky])
}

fn letter_z(h: &FingerExtensionState) -> bool {
    h.only(&[Index]) && h.point(INDEX_TIP).x < h.point(INDEX_PIP).x - 0.03
}

// --- Words ---

fn word_i_love_you(h: &FingerExtensionState) -> bool {
    h.only(&[Thumb, Index, Pinky])
}

fn word_hello(h: &FingerExtensionState) -> bool {
    h.extended_count() == 5
}

fn word_yes(h: &FingerExtensionState) -> bool {
    h.extended_count() == 0
}

fn word_no(h: &FingerExtensionState) -> bool {
    h.only(&[Index, Middle]) && tip_gap_x(h, INDEX_TIP, MIDDLE_TIP) < 0.03
}

// Wrist low in the frame stands in for "hand at the chest".
fn word_please(h: &FingerExtensionState) -> bool {
    h.extended_count() >= 4 && h.point(WRIST).y > 0.5
}

fn word_drink(h: &FingerExtensionState) -> bool {
    h.only(&[Thumb]) && h.point(THUMB_TIP).y < 0.4
}

fn word_rain(h: &FingerExtensionState) -> bool {
    h.extended_count() >= 4
        && h.point(INDEX_TIP).y > h.point(INDEX_PIP).y
        && h.point(MIDDLE_TIP).y > h.point(MIDDLE_PIP).y
}

fn word_eat(h: &FingerExtensionState) -> bool {
    h.folded(&NON_THUMB) && h.point(INDEX_TIP).y < 0.35 && h.point(WRIST).y < 0.5
}

fn word_thirsty(h: &FingerExtensionState) -> bool {
    h.index
        && h.folded(&[Middle, Ring, Pinky])
        && h.point(INDEX_TIP).y > h.point(INDEX_PIP).y
        && h.point(INDEX_TIP).y < 0.4
}

fn word_say(h: &FingerExtensionState) -> bool {
    let tip = h.point(INDEX_TIP);
    h.index && h.folded(&[Middle, Ring, Pinky]) && tip.y < 0.3 && tip.x > 0.4 && tip.x < 0.6
}

fn word_maybe(h: &FingerExtensionState) -> bool {
    let wrist_y = h.point(WRIST).y;
    h.extended_count() >= 4
        && wrist_y > 0.4
        && wrist_y < 0.6
        && tip_gap_y(h, INDEX_TIP, PINKY_TIP) < 0.05
}

fn word_dont_know(h: &FingerExtensionState) -> bool {
    h.extended_count() >= 3 && h.point(INDEX_TIP).y < 0.25
}

fn word_forget(h: &FingerExtensionState) -> bool {
    let wrist = h.point(WRIST);
    h.extended_count() >= 4 && wrist.y < 0.3 && h.point(INDEX_TIP).x > wrist.x + 0.1
}

fn word_walk(h: &FingerExtensionState) -> bool {
    h.raised(&[Index, Middle])
        && h.folded(&[Ring, Pinky])
        && h.point(INDEX_TIP).y > h.point(WRIST).y
}

fn word_shirt(h: &FingerExtensionState) -> bool {
    h.only(&[Thumb, Index]) && touching(h, THUMB_TIP, INDEX_TIP, 0.08) && h.point(WRIST).y > 0.4
}

fn word_book(h: &FingerExtensionState) -> bool {
    let wrist_y = h.point(WRIST).y;
    h.extended_count() >= 4
        && tip_gap_y(h, INDEX_TIP, PINKY_TIP) < 0.03
        && wrist_y > 0.45
        && wrist_y < 0.55
}

fn word_look(h: &FingerExtensionState) -> bool {
    h.raised(&[Index, Middle])
        && h.folded(&[Ring, Pinky])
        && h.point(INDEX_TIP).y < 0.3
        && h.point(MIDDLE_TIP).y < 0.3
}

fn word_how(h: &FingerExtensionState) -> bool {
    let count = h.extended_count();
    (3..=4).contains(&count)
        && h.point(INDEX_TIP).y > h.point(INDEX_PIP).y - 0.05
        && h.point(WRIST).y > 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poses::PoseBuilder;

    fn label_of(pose: &PoseBuilder) -> GestureMatch {
        classify(&pose.state())
    }

    fn assert_match(pose: PoseBuilder, gesture: Gesture, confidence: f64) {
        let result = label_of(&pose);
        assert_eq!(result.gesture, Some(gesture), "pose {:?}", pose.state());
        assert!((result.confidence - confidence).abs() < 1e-12);
    }

    #[test]
    fn fist_is_yes() {
        assert_match(PoseBuilder::fist(), Gesture::Yes, 0.6);
    }

    #[test]
    fn open_palm_is_hello() {
        assert_match(PoseBuilder::open_palm(), Gesture::Hello, 0.8);
    }

    #[test]
    fn peace_sign_splits_on_finger_gap() {
        // Fist places the index tip at x = 0.45 and the middle tip at x = 0.50.
        let apart = PoseBuilder::fist().extend(Index).extend(Middle);
        assert_match(apart.clone(), Gesture::V, 0.85);

        let together = apart.set(MIDDLE_TIP, 0.47, 0.40);
        assert_match(together, Gesture::U, 0.8);
    }

    #[test]
    fn static_letters() {
        assert_match(PoseBuilder::fist().extend(Thumb), Gesture::A, 0.85);
        assert_match(
            PoseBuilder::fist().extend(Index).extend(Middle).extend(Ring).extend(Pinky),
            Gesture::B,
            0.85,
        );
        assert_match(PoseBuilder::fist().extend(Pinky), Gesture::I, 0.85);
        assert_match(PoseBuilder::fist().extend(Thumb).extend(Index), Gesture::L, 0.85);
        assert_match(PoseBuilder::fist().extend(Thumb).extend(Pinky), Gesture::Y, 0.85);
        assert_match(
            PoseBuilder::fist().extend(Thumb).extend(Index).extend(Pinky),
            Gesture::ILoveYou,
            0.9,
        );
    }

    #[test]
    fn distance_band_letters() {
        // C: three fingers up, thumb tip 0.1 to the side of the index tip.
        let c = PoseBuilder::fist()
            .extend(Index)
            .extend(Middle)
            .set(THUMB_TIP, 0.35, 0.65);
        assert_match(c, Gesture::C, 0.75);

        // D: index up, thumb tip resting on the middle fingertip.
        let d = PoseBuilder::fist().extend(Index).set(THUMB_TIP, 0.50, 0.62);
        assert_match(d, Gesture::D, 0.8);

        // O: all folded, thumb tip touching the index tip.
        let o = PoseBuilder::fist().set(THUMB_TIP, 0.46, 0.62);
        assert_match(o, Gesture::O, 0.8);
    }

    #[test]
    fn tilted_letters() {
        // J is only reachable with the thumb out; a tucked thumb is caught by I.
        let j = PoseBuilder::fist().extend(Thumb).extend(Pinky).set(PINKY_TIP, 0.40, 0.42);
        assert_match(j, Gesture::J, 0.75);
        let i = PoseBuilder::fist().extend(Pinky).set(PINKY_TIP, 0.40, 0.42);
        assert_match(i, Gesture::I, 0.85);

        let z = PoseBuilder::fist().extend(Index).set(INDEX_TIP, 0.40, 0.40);
        assert_match(z, Gesture::Z, 0.75);
    }

    #[test]
    fn position_words() {
        let please = PoseBuilder::fist().extend(Thumb).extend(Index).extend(Middle).extend(Ring);
        assert_match(please, Gesture::Please, 0.6);

        let maybe = PoseBuilder::fist()
            .wrist(0.50, 0.45)
            .extend(Thumb)
            .extend(Index)
            .extend(Middle)
            .extend(Pinky);
        assert_match(maybe, Gesture::Maybe, 0.65);

        let say = PoseBuilder::fist().extend(Index).set(INDEX_TIP, 0.45, 0.25);
        assert_match(say, Gesture::Say, 0.7);

        let dont_know = PoseBuilder::fist()
            .extend(Thumb)
            .extend(Index)
            .extend(Ring)
            .set(INDEX_TIP, 0.45, 0.20);
        assert_match(dont_know, Gesture::DontKnow, 0.65);

        let forget = PoseBuilder::fist()
            .wrist(0.40, 0.20)
            .extend(Thumb)
            .extend(Middle)
            .extend(Ring)
            .extend(Pinky)
            .set(INDEX_TIP, 0.55, 0.60);
        assert_match(forget, Gesture::Forget, 0.65);

        let walk = PoseBuilder::fist()
            .wrist(0.50, 0.30)
            .extend(Thumb)
            .extend(Index)
            .extend(Middle)
            .set(MIDDLE_TIP, 0.47, 0.40);
        assert_match(walk, Gesture::Walk, 0.7);

        let look = PoseBuilder::fist()
            .extend(Thumb)
            .extend(Index)
            .extend(Middle)
            .set(INDEX_TIP, 0.45, 0.28)
            .set(MIDDLE_TIP, 0.47, 0.28);
        assert_match(look, Gesture::Look, 0.7);

        let how = PoseBuilder::fist().extend(Thumb).extend(Middle).extend(Ring);
        assert_match(how, Gesture::How, 0.65);
    }

    #[test]
    fn cascade_order_decides_overlaps() {
        // A fist with the thumb touching the index tip satisfies both O and Yes.
        let pose = PoseBuilder::fist().set(THUMB_TIP, 0.46, 0.62);
        let state = pose.state();
        let o = CASCADE.iter().position(|r| r.gesture == Gesture::O).unwrap();
        let yes = CASCADE.iter().position(|r| r.gesture == Gesture::Yes).unwrap();
        assert!(CASCADE[o].matches(&state) && CASCADE[yes].matches(&state));
        assert!(o < yes);
        assert_eq!(classify(&state).gesture, Some(Gesture::O));
    }

    #[test]
    fn tight_pair_without_thumb_is_u_not_no() {
        let pose = PoseBuilder::fist()
            .extend(Index)
            .extend(Middle)
            .set(MIDDLE_TIP, 0.46, 0.40);
        let state = pose.state();
        let no = CASCADE.iter().find(|r| r.gesture == Gesture::No).unwrap();
        assert!(no.matches(&state));
        assert_eq!(classify(&state).gesture, Some(Gesture::U));
    }

    #[test]
    fn shadowed_rules_never_win_across_a_pose_sweep() {
        let coords = [0.05, 0.2, 0.3, 0.38, 0.45, 0.5, 0.55, 0.62, 0.75, 0.95];
        let mut seen = std::collections::HashSet::new();

        for mask in 0u8..32 {
            let base = Finger::ALL
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .fold(PoseBuilder::fist(), |pose, (_, finger)| pose.extend(*finger));

            for &wx in &coords {
                for &wy in &coords {
                    for &tip_x in &coords {
                        let pose = base
                            .clone()
                            .wrist(wx, wy)
                            .set(INDEX_TIP, tip_x, base.frame().point(INDEX_TIP).y)
                            .set(THUMB_TIP, 1.0 - tip_x, wy - 0.1);
                        if let Some(g) = label_of(&pose).gesture {
                            seen.insert(g);
                        }
                    }
                }
            }
        }

        for gesture in SHADOWED {
            assert!(!seen.contains(&gesture), "{} fired", gesture);
        }
        assert!(seen.contains(&Gesture::Hello));
        assert!(seen.contains(&Gesture::Yes));
    }

    #[test]
    fn unmatched_pose_yields_empty_match() {
        // A lone ring finger is not part of any sign in the vocabulary.
        let pose = PoseBuilder::fist().extend(Ring);
        assert_eq!(label_of(&pose), GestureMatch::none());
        assert_eq!(classify_frame(None), GestureMatch::none());
    }

    #[test]
    fn classification_is_deterministic() {
        let state = PoseBuilder::fist().extend(Index).extend(Middle).state();
        let first = classify(&state);
        for _ in 0..10 {
            assert_eq!(classify(&state), first);
        }
    }
}
