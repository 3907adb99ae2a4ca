//! Weighted search vector for ranked full-text search.
//!
//! The vector is kept as a list of weighted texts; the storage layer turns it
//! into a `tsvector` expression with `setweight(to_tsvector(..), 'W')`.

use std::fmt;

use serde::Serialize;
use storefront_core::{AssignedAttribute, Product};

use crate::render::{Target, attribute_value_texts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchWeight {
    A,
    B,
    C,
    D,
}

impl SearchWeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for SearchWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedText {
    pub text: String,
    pub weight: SearchWeight,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchVector {
    terms: Vec<WeightedText>,
}

impl SearchVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, weight: SearchWeight) {
        self.terms.push(WeightedText {
            text: text.into(),
            weight,
        });
    }

    pub fn append(&mut self, other: SearchVector) {
        self.terms.extend(other.terms);
    }

    pub fn terms(&self) -> &[WeightedText] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

pub fn prepare_product_search_vector_value(product: &Product) -> SearchVector {
    let mut search_vector = SearchVector::new();
    search_vector.push(product.name.clone(), SearchWeight::A);
    search_vector.push(product.description_plaintext.clone(), SearchWeight::C);

    search_vector.append(generate_attributes_search_vector_value(&product.attributes));
    search_vector.append(generate_variants_search_vector_value(product));

    search_vector
}

/// Each variant's SKU and name at weight A, followed by variant attributes.
pub fn generate_variants_search_vector_value(product: &Product) -> SearchVector {
    let mut search_vector = SearchVector::new();

    for variant in &product.variants {
        let text = [variant.sku.as_deref().unwrap_or_default(), variant.name.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        search_vector.push(text, SearchWeight::A);
    }

    for variant in &product.variants {
        search_vector.append(generate_attributes_search_vector_value(&variant.attributes));
    }

    search_vector
}

pub fn generate_attributes_search_vector_value(
    assigned_attributes: &[AssignedAttribute],
) -> SearchVector {
    let mut search_vector = SearchVector::new();
    for assigned in assigned_attributes {
        for text in attribute_value_texts(assigned, Target::Vector) {
            search_vector.push(text, SearchWeight::B);
        }
    }
    search_vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::product;

    fn term(text: &str, weight: SearchWeight) -> WeightedText {
        WeightedText {
            text: text.to_string(),
            weight,
        }
    }

    #[test]
    fn product_vector_weights_fields_attributes_and_variants() {
        let vector = prepare_product_search_vector_value(&product());

        assert_eq!(
            vector.terms(),
            [
                term("Summer Tee", SearchWeight::A),
                term("Light Shirt", SearchWeight::C),
                term("Blue", SearchWeight::B),
                term("Green", SearchWeight::B),
                term("Organic Cotton", SearchWeight::B),
                term("10 KG", SearchWeight::B),
                term("2021-06-23 10:00:00", SearchWeight::B),
                term("TEE-S Small", SearchWeight::A),
                term("Large", SearchWeight::A),
                term("S", SearchWeight::B),
                term("XL", SearchWeight::B),
            ]
        );
    }

    #[test]
    fn product_without_attributes_or_variants_has_two_terms() {
        let mut product = product();
        product.attributes.clear();
        product.variants.clear();

        let vector = prepare_product_search_vector_value(&product);

        assert_eq!(vector.terms().len(), 2);
        assert!(generate_variants_search_vector_value(&product).is_empty());
    }
}
