#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    arabic_doc_scanner_lib::run()
}
