//! # Docsync Parser
//!
//! Turns semi-structured markdown documents into typed records.
//!
//! ## Pipeline
//!
//! ```text
//! (path, content)
//!     │
//!     ├──> Frontmatter (`---` block: scalars, lists)
//!     ├──> Anchors (`<!-- id: x -->`, title anchor = primary id)
//!     ├──> Type inference (frontmatter → id prefix → path → undetermined)
//!     ├──> Relations
//!     │      ├─ "Dependencies" table → depends edges
//!     │      ├─ "Consumers" table   → consumes edges (reversed)
//!     │      └─ markdown links      → references
//!     └──> Keywords (title > section > description)
//! ```
//!
//! ## Example
//!
//! ```
//! use docsync_parser::{parse_document, DocType};
//!
//! let doc = parse_document("features/login.md", "# Login <!-- id: feat_login -->\n").unwrap();
//! assert_eq!(doc.id, "feat_login");
//! assert_eq!(doc.doc_type, DocType::Feature);
//! ```

mod anchor;
mod doc_type;
mod document;
mod error;
mod frontmatter;
mod keywords;
mod markdown;
mod relations;
mod slug;

pub use anchor::{extract_anchors, strip_anchors, Anchor, AnchorScan};
pub use doc_type::{
    DocType, DocTypeRegistry, FrontmatterTypeInference, IdPrefixInference, PathInference,
    TypeContext, TypeInference, TypeInferenceChain, TypeSchema,
};
pub use document::{normalize_path, parse_document, DocStatus, Document, DocumentParser};
pub use error::{ParseError, Result};
pub use frontmatter::{split_frontmatter, Frontmatter, FrontmatterValue};
pub use keywords::{extract_keywords, extract_keywords_from_text, tokenize, Keyword, KeywordSource};
pub use relations::{
    extract_relations, resolve_link, DependencyKind, DocLink, ExtractedRelations, Relation,
    RelationType,
};
pub use slug::{basename_slug, slugify, table_target_id, SPEC_PREFIX};
