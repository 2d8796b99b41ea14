pub mod document;
pub mod html;
pub mod rasterizer;

pub use document::{QuotationDocument, PAGE_HEIGHT_PX, PAGE_WIDTH_PX};
pub use html::{register_template_filters, DocumentRenderer, RenderError};
pub use rasterizer::{
    is_wkhtmltopdf_available, rasterizer_for, HtmlRasterizer, RasterizeError, Rasterizer,
    RenderedFile, WkhtmltopdfRasterizer,
};
