pub mod document;
pub mod editorjs;
pub mod index;
mod render;
pub mod vector;

pub use document::prepare_product_search_document_value;
pub use editorjs::clean_editor_js_text;
pub use index::{
    SearchIndexStore, update_product_search_document, update_products_search_document,
};
pub use vector::{SearchVector, SearchWeight, WeightedText, prepare_product_search_vector_value};
