pub mod cancel;
pub mod event;
pub mod presence;
pub mod reactor;
pub mod scheduler;
pub mod state;
pub mod telemetry;
pub mod time;
