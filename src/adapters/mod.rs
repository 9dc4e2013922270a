//! Concrete adapter implementations for ports.

pub mod console_progress;
pub mod console_table;
pub mod csv_report_adapter;
pub mod file_config_adapter;
pub mod html_report_adapter;
pub mod symbol_list_adapter;
pub mod xlsx_report_adapter;
pub mod yahoo_adapter;
