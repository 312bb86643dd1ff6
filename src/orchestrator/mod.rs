mod controller;

pub(crate) use controller::{run_controller, UiCommand};
