// This file is an example of how to use the `sign_vision` library.
// The library entry point is `src/lib.rs`.

use sign_vision::pipeline::{GesturePipeline, PipelineConfig, Report};
use sign_vision::poses::PoseBuilder;

fn main() {
    println!("Sign Vision Engine - Example Runner");
    let mut pipeline = GesturePipeline::new(PipelineConfig::default());
    let palm = PoseBuilder::open_palm().points();

    for frame in 1..=3 {
        match pipeline.generate_report(Some(&palm)) {
            Report::GestureConfirmed(event) => {
                println!("frame {frame}: {} ({:.2})", event.gesture, event.confidence)
            }
            Report::NoConfirmedGesture => println!("frame {frame}: holding..."),
        }
    }
}
