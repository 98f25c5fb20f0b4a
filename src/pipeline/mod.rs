//! Pipeline stages for PDF-to-text extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the rendering backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! render ──▶ page ──▶ assemble
//! (pdfium)   (OCR + isolation)   (txt / md / layout JSON)
//! ```
//!
//! 1. [`render`]   — bind pdfium, open the document, rasterise one page at
//!    a time; runs in `spawn_blocking` because pdfium is not async-safe
//! 2. [`page`]     — drive render + recognise per page, converting failures
//!    into failure outcomes instead of aborting the document
//! 3. [`assemble`] — fold the ordered outcomes into the plain-text,
//!    markdown, and layout-JSON document representations

pub mod assemble;
pub mod page;
pub mod render;
