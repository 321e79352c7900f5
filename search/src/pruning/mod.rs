mod mpc;

pub use mpc::{can_probcut, provable, MpcModel, MpcParams, MpcSample};
