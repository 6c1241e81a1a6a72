use super::concat_pages;
use crate::error::Error;
use pdfium_render::prelude::Pdfium;

/// Extracts the full document text from uploaded PDF bytes, page by page in
/// order. An unreadable document fails; a document with no extractable text
/// passes through as an empty string.
pub fn extract_text(bytes: &[u8]) -> Result<String, Error> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_library("./libpdfium.so")
            .map_err(|e| Error::Extraction(format!("{:?}", e)))?,
    );
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| Error::Extraction(format!("{:?}", e)))?;

    let mut pages = vec![];
    for page in document.pages().iter() {
        let text = page
            .text()
            .map_err(|e| Error::Extraction(format!("{:?}", e)))?
            .all();
        pages.push(text);
    }
    Ok(concat_pages(pages))
}
