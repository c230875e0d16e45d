mod discovery;
mod logging;
mod utils;
