pub mod launch;
pub mod motion;
pub mod solver;
pub mod trajectory;
pub mod window;
