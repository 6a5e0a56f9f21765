mod aggregate;
mod client;
mod commands;
mod documents;
mod export;
mod labels;
mod session;
mod table;
mod types;

use commands::AppState;
use session::Session;
use std::sync::Mutex;
use tauri::Manager;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let app_data_dir = app.path().app_data_dir().map_err(|e| e.to_string())?;
            // Load .env from the app data dir so production users can point
            // the app at their backend (Settings → Open app data folder)
            let env_path = app_data_dir.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
            } else {
                let _ = dotenvy::dotenv();
            }
            let client = client::ApiClient::from_env().map_err(|e| e.to_string())?;
            tracing::info!(backend = %client.base_url(), "backend client ready");
            app.manage(AppState {
                session: Mutex::new(Session::default()),
                client,
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_app_version,
            commands::get_backend_url,
            commands::get_backend_status,
            commands::open_app_data_folder,
            commands::check_health,
            commands::validate_document_file,
            commands::upload_document,
            commands::reanalyze_page,
            commands::run_document_analysis,
            commands::get_document_status,
            commands::get_document_result,
            commands::get_documents,
            commands::get_combined_fields,
            commands::get_insight_fields,
            commands::get_combined_text,
            commands::get_page_overview,
            commands::select_page,
            commands::set_field_override,
            commands::clear_field_overrides,
            commands::get_table_state,
            commands::get_table_rows,
            commands::stage_new_row,
            commands::add_table_row,
            commands::begin_row_edit,
            commands::save_row_edit,
            commands::cancel_row_edit,
            commands::delete_table_row,
            commands::export_report,
            commands::export_result_json,
            commands::export_table_excel,
            commands::read_file_base64,
            commands::reset_session,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
