pub mod input_scanner;
pub mod toml_loader;

pub use input_scanner::scan_inputs;
pub use toml_loader::{load_settings, save_settings};
