//! evalmatrix-report: Result sheet exports.
//!
//! Renders a `ResultSheet` as a self-contained HTML document, ready to be
//! printed or converted to PDF.

pub mod html;

pub use html::{generate_html, write_html_report};
