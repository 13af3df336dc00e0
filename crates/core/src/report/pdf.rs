//! A4 rendering with the built-in Helvetica faces.
#![allow(clippy::float_arithmetic)]

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::{Report, ReportError};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 6.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Writes lines top-down, starting a new page when the bottom margin is hit.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl Cursor<'_> {
    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn line(&mut self, text: &str, size: f32, height: f32, font: &IndirectFontRef) {
        self.ensure_room(height);
        self.y -= height;
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
    }

    fn row<S: AsRef<str>>(&mut self, cells: &[S], widths: &[u16], font: &IndirectFontRef) {
        self.ensure_room(ROW_HEIGHT);
        self.y -= ROW_HEIGHT;
        let mut x = MARGIN;
        for (cell, width) in cells.iter().zip(widths) {
            self.layer.use_text(cell.as_ref(), 9.0, Mm(x), Mm(self.y), font);
            x += f32::from(*width);
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }
}

fn font(doc: &PdfDocumentReference, face: BuiltinFont) -> Result<IndirectFontRef, ReportError> {
    doc.add_builtin_font(face)
        .map_err(|e| ReportError::Render(e.to_string()))
}

/// Renders `report` to PDF bytes.
///
/// # Errors
///
/// Returns [`ReportError::Render`] if a font cannot be embedded or the
/// document cannot be serialized.
pub fn render_pdf(report: &Report) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) =
        PdfDocument::new(report.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: font(&doc, BuiltinFont::Helvetica)?,
        bold: font(&doc, BuiltinFont::HelveticaBold)?,
        italic: font(&doc, BuiltinFont::HelveticaOblique)?,
    };

    let mut cursor = Cursor {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - MARGIN,
    };

    cursor.line(&report.title, 20.0, 12.0, &fonts.bold);
    cursor.gap(3.0);
    cursor.line(&report.date_line, 10.0, 6.0, &fonts.regular);
    cursor.gap(6.0);

    for section in &report.sections {
        let widths: Vec<u16> = section.columns.iter().map(|(_, w)| *w).collect();
        let titles: Vec<&str> = section.columns.iter().map(|(t, _)| t.as_str()).collect();

        cursor.line(&section.heading, 14.0, 10.0, &fonts.bold);
        cursor.row(&titles, &widths, &fonts.bold);
        for row in &section.rows {
            cursor.row(row, &widths, &fonts.regular);
        }
        cursor.gap(10.0);
    }

    let (label, value) = &report.global_balance;
    cursor.row(&[label.as_str(), value.as_str()], &[100, 80], &fonts.bold);
    cursor.gap(20.0);
    cursor.line(&report.footer, 8.0, 5.0, &fonts.italic);

    doc.save_to_bytes()
        .map_err(|e| ReportError::Render(e.to_string()))
}
