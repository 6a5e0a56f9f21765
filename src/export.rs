//! Exports of the current table and the original result: a printable
//! right-to-left HTML report, a JSON dump, and an Excel workbook. All
//! artifacts land in the user's Downloads folder (Desktop as fallback).

use crate::types::{ProcessingResult, TableRow};
use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document")
        .to_string()
}

fn output_dir() -> Result<PathBuf, String> {
    dirs::download_dir()
        .or_else(dirs::desktop_dir)
        .ok_or_else(|| "Could not find Downloads or Desktop folder.".to_string())
}

/// First free path `<dir>/<base>.<ext>`, `<dir>/<base>_2.<ext>`, ...
fn unique_path(dir: &Path, base: &str, ext: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.{}", base, ext));
    let mut counter = 2u32;
    while path.exists() {
        path = dir.join(format!("{}_{}.{}", base, counter, ext));
        counter += 1;
    }
    path
}

/// Standalone right-to-left HTML document for the current table. Columns are
/// value-then-key, one row per table row, with the generation timestamp in
/// the header; the page asks the browser to print itself once loaded.
pub fn build_report_html(rows: &[TableRow], filename: &str) -> String {
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M");
    let mut body_rows = String::new();
    for row in rows {
        body_rows.push_str(&format!(
            "      <tr><td>{}</td><td class=\"key\">{}</td></tr>\n",
            html_escape(&row.value),
            html_escape(&row.key)
        ));
    }
    format!(
        "<!DOCTYPE html>\n\
         <html dir=\"rtl\" lang=\"ar\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>تقرير البيانات المستخرجة</title>\n\
         <style>\n\
         body {{ font-family: \"Segoe UI\", Tahoma, sans-serif; margin: 2em; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #999; padding: 6px 10px; text-align: right; }}\n\
         th {{ background: #f0f0f0; }}\n\
         td.key {{ font-weight: bold; white-space: nowrap; }}\n\
         .meta {{ color: #555; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <h1>تقرير البيانات المستخرجة</h1>\n\
         <p class=\"meta\">المستند: {} &mdash; تاريخ الإنشاء: {}</p>\n\
         <table>\n\
         <thead><tr><th>القيمة</th><th>الحقل</th></tr></thead>\n\
         <tbody>\n{}    </tbody>\n\
         </table>\n\
         <script>window.addEventListener('load', function () {{ window.print(); }});</script>\n\
         </body>\n\
         </html>\n",
        html_escape(filename),
        generated,
        body_rows
    )
}

/// Write the printable report and hand it to the system browser so the user
/// can print or save it as PDF. Returns the written path.
pub fn export_report(rows: &[TableRow], filename: &str) -> Result<String, String> {
    if rows.is_empty() {
        return Err("The table is empty. Add at least one row before exporting.".to_string());
    }
    let dir = output_dir()?;
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = unique_path(&dir, &format!("{}_report_{}", file_stem(filename), stamp), "html");
    let html = build_report_html(rows, filename);
    std::fs::write(&path, html).map_err(|e| format!("Could not write report: {}", e))?;
    opener::open(&path).map_err(|e| format!("Could not open report: {}", e))?;
    Ok(path.to_string_lossy().into_owned())
}

/// Dump the full original result (not the edited table) as pretty JSON named
/// after the uploaded file.
pub fn export_result_json(result: &ProcessingResult) -> Result<String, String> {
    let dir = output_dir()?;
    let path = unique_path(&dir, &format!("{}_analysis", file_stem(&result.filename)), "json");
    let json = serde_json::to_string_pretty(result).map_err(|e| e.to_string())?;
    std::fs::write(&path, json).map_err(|e| format!("Could not write JSON: {}", e))?;
    Ok(path.to_string_lossy().into_owned())
}

/// Write the table rows to a fresh two-column workbook.
pub fn export_table_excel(rows: &[TableRow], filename: &str) -> Result<String, String> {
    if rows.is_empty() {
        return Err("The table is empty. Add at least one row before exporting.".to_string());
    }
    let dir = output_dir()?;
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = unique_path(&dir, &format!("{}_table_{}", file_stem(filename), stamp), "xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Extracted Data")
        .map_err(|e: XlsxError| e.to_string())?;
    worksheet.set_right_to_left(true);

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x2563EB))
        .set_font_color(Color::RGB(0xFFFFFF));

    let key_width = rows
        .iter()
        .map(|r| r.key.chars().count())
        .chain(std::iter::once(8))
        .max()
        .unwrap_or(8) as f64;
    let value_width = rows
        .iter()
        .map(|r| r.value.chars().count().min(80))
        .chain(std::iter::once(10))
        .max()
        .unwrap_or(10) as f64;
    worksheet
        .set_column_width(0, key_width + 2.0)
        .map_err(|e: XlsxError| e.to_string())?;
    worksheet
        .set_column_width(1, value_width + 2.0)
        .map_err(|e: XlsxError| e.to_string())?;

    worksheet
        .write_string_with_format(0, 0, "الحقل", &header_format)
        .map_err(|e: XlsxError| e.to_string())?;
    worksheet
        .write_string_with_format(0, 1, "القيمة", &header_format)
        .map_err(|e: XlsxError| e.to_string())?;

    for (idx, row) in rows.iter().enumerate() {
        let excel_row = (idx + 1) as u32;
        worksheet
            .write_string(excel_row, 0, &row.key)
            .map_err(|e: XlsxError| e.to_string())?;
        worksheet
            .write_string(excel_row, 1, &row.value)
            .map_err(|e: XlsxError| e.to_string())?;
    }

    workbook
        .save(&path)
        .map_err(|e: XlsxError| e.to_string())?;
    Ok(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, key: &str, value: &str) -> TableRow {
        TableRow {
            id: id.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn report_is_rtl_and_contains_every_row() {
        let rows = vec![
            row("1", "الاسم", "محمد سليم"),
            row("2", "التاريخ", "11/11/2018"),
        ];
        let html = build_report_html(&rows, "residence.pdf");
        assert!(html.contains("dir=\"rtl\""));
        assert!(html.contains("محمد سليم"));
        assert!(html.contains("التاريخ"));
        assert!(html.contains("residence.pdf"));
        assert_eq!(html.matches("<tr><td>").count(), rows.len());
    }

    #[test]
    fn report_orders_value_before_key() {
        let rows = vec![row("1", "المفتاح", "القيمة")];
        let html = build_report_html(&rows, "doc.pdf");
        let value_pos = html.find("القيمة</td>").expect("value cell");
        let key_pos = html.find("المفتاح</td>").expect("key cell");
        assert!(value_pos < key_pos);
    }

    #[test]
    fn report_escapes_html_in_cells() {
        let rows = vec![row("1", "<b>key</b>", "a & b")];
        let html = build_report_html(&rows, "doc.pdf");
        assert!(html.contains("&lt;b&gt;key&lt;/b&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("<b>key</b>"));
    }

    #[test]
    fn unique_path_appends_counter_on_collision() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = unique_path(dir.path(), "report", "html");
        std::fs::write(&first, "x").expect("write");
        let second = unique_path(dir.path(), "report", "html");
        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("report_2.html"));
    }

    #[test]
    fn file_stem_strips_extension_and_defaults() {
        assert_eq!(file_stem("scan.pdf"), "scan");
        assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem(""), "document");
    }

    #[test]
    fn empty_table_export_is_rejected() {
        assert!(export_report(&[], "doc.pdf").is_err());
        assert!(export_table_excel(&[], "doc.pdf").is_err());
    }
}
