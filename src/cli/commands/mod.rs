mod function_app;
mod logic_app;

pub use function_app::execute_function_app;
pub use logic_app::execute_logic_app;
