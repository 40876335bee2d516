//! Output file naming

const PDF_EXTENSION: &str = ".pdf";

/// Strip one trailing `.pdf`, ignoring case
pub fn strip_pdf_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(PDF_EXTENSION.len());
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(PDF_EXTENSION) => stem,
        _ => name,
    }
}

/// `<first-stem>+<second-stem>-merged.pdf`
pub fn merged_file_name(first: &str, second: &str) -> String {
    format!(
        "{}+{}-merged.pdf",
        strip_pdf_extension(first),
        strip_pdf_extension(second)
    )
}
