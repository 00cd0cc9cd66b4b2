pub mod classifier;
pub mod finger_state;
pub mod gesture;
pub mod landmark;
pub mod stabilizer;
pub mod transcript;
