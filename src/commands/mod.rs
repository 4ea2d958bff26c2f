pub type CmdResult<T> = beyond::Result<(T, i32)>;

pub mod setup;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (beyond::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Setup(args) => dispatch!(args, setup),
    }
}
