pub mod balance;
pub mod classifier;

pub use classifier::{BuyClassifier, BuyEvent, ClassifierSettings};
