pub mod db_errors;
pub mod state;
