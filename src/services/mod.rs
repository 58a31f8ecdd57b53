// Smartmark services
// Stateless helpers and process-wide setup: formatting, settings, logging.

pub mod formatting;
pub mod logging;
pub mod settings_engine;
