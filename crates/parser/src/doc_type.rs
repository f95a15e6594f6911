use crate::frontmatter::Frontmatter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocType {
    Prd,
    Feature,
    Capability,
    Flow,
    Design,
    Spec,
    TestVariant,
    Template,
    /// No strategy could decide. Valid; type-specific checks are skipped.
    Undetermined,
}

impl DocType {
    pub const ALL: [Self; 8] = [
        Self::Prd,
        Self::Feature,
        Self::Capability,
        Self::Flow,
        Self::Design,
        Self::Spec,
        Self::TestVariant,
        Self::Template,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prd => "prd",
            Self::Feature => "feature",
            Self::Capability => "capability",
            Self::Flow => "flow",
            Self::Design => "design",
            Self::Spec => "spec",
            Self::TestVariant => "test-variant",
            Self::Template => "template",
            Self::Undetermined => "undetermined",
        }
    }

    /// Parse a type name; accepts `test_variant` as an alias of `test-variant`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == normalized)
    }

    /// Features, capabilities and flows are tracked as work items.
    #[must_use]
    pub const fn is_work_item(self) -> bool {
        matches!(self, Self::Feature | Self::Capability | Self::Flow)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frontmatter requirements for one document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    pub doc_type: DocType,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

/// Registry of valid document types and their frontmatter fields.
#[derive(Debug, Clone)]
pub struct DocTypeRegistry {
    schemas: Vec<TypeSchema>,
}

impl Default for DocTypeRegistry {
    fn default() -> Self {
        const WORK_ITEM_OPTIONAL: &[&str] = &["domain", "summary", "owner", "tags"];
        let schemas = vec![
            TypeSchema {
                doc_type: DocType::Prd,
                required: &["type", "name"],
                optional: &["version", "status"],
            },
            TypeSchema {
                doc_type: DocType::Feature,
                required: &["type", "status"],
                optional: WORK_ITEM_OPTIONAL,
            },
            TypeSchema {
                doc_type: DocType::Capability,
                required: &["type", "status"],
                optional: WORK_ITEM_OPTIONAL,
            },
            TypeSchema {
                doc_type: DocType::Flow,
                required: &["type", "status"],
                optional: WORK_ITEM_OPTIONAL,
            },
            TypeSchema {
                doc_type: DocType::Design,
                required: &["type"],
                optional: &["domain", "status", "feature"],
            },
            TypeSchema {
                doc_type: DocType::Spec,
                required: &["type"],
                optional: &["domain", "status", "version"],
            },
            TypeSchema {
                doc_type: DocType::TestVariant,
                required: &["type", "target"],
                optional: &["status"],
            },
            TypeSchema {
                doc_type: DocType::Template,
                required: &[],
                optional: &["type", "version"],
            },
        ];
        Self { schemas }
    }
}

impl DocTypeRegistry {
    #[must_use]
    pub fn schema(&self, doc_type: DocType) -> Option<&TypeSchema> {
        self.schemas.iter().find(|s| s.doc_type == doc_type)
    }

    /// Resolve a type name against the registered set.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<DocType> {
        DocType::parse(name).filter(|ty| self.schema(*ty).is_some())
    }

    /// Required fields absent from `frontmatter`. Undetermined or unregistered types have none.
    #[must_use]
    pub fn missing_fields(&self, doc_type: DocType, frontmatter: &Frontmatter) -> Vec<&'static str> {
        self.schema(doc_type)
            .map(|schema| {
                schema
                    .required
                    .iter()
                    .copied()
                    .filter(|field| !frontmatter.contains_key(field))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Inputs available to type inference.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    pub path: &'a str,
    pub id: &'a str,
    pub frontmatter: &'a Frontmatter,
}

/// One step in the type inference cascade.
pub trait TypeInference: Send + Sync {
    fn name(&self) -> &'static str;
    fn infer(&self, ctx: &TypeContext<'_>, registry: &DocTypeRegistry) -> Option<DocType>;
}

/// Explicit `type:` frontmatter field.
pub struct FrontmatterTypeInference;

impl TypeInference for FrontmatterTypeInference {
    fn name(&self) -> &'static str {
        "frontmatter"
    }

    fn infer(&self, ctx: &TypeContext<'_>, registry: &DocTypeRegistry) -> Option<DocType> {
        ctx.frontmatter
            .scalar("type")
            .and_then(|name| registry.lookup(name))
    }
}

/// Id prefix such as `feat_`, `cap_`, `spec_`.
pub struct IdPrefixInference;

const ID_PREFIXES: &[(&str, DocType)] = &[
    ("prd_", DocType::Prd),
    ("feat_", DocType::Feature),
    ("feature_", DocType::Feature),
    ("cap_", DocType::Capability),
    ("flow_", DocType::Flow),
    ("design_", DocType::Design),
    ("spec_", DocType::Spec),
    ("test_", DocType::TestVariant),
    ("tv_", DocType::TestVariant),
    ("tmpl_", DocType::Template),
];

impl TypeInference for IdPrefixInference {
    fn name(&self) -> &'static str {
        "id-prefix"
    }

    fn infer(&self, ctx: &TypeContext<'_>, registry: &DocTypeRegistry) -> Option<DocType> {
        ID_PREFIXES
            .iter()
            .find(|(prefix, _)| ctx.id.starts_with(prefix))
            .map(|(_, ty)| *ty)
            .filter(|ty| registry.schema(*ty).is_some())
    }
}

/// Well-known directory and file names.
pub struct PathInference;

const PATH_SEGMENTS: &[(&str, DocType)] = &[
    ("features", DocType::Feature),
    ("capabilities", DocType::Capability),
    ("flows", DocType::Flow),
    ("designs", DocType::Design),
    ("design", DocType::Design),
    ("specs", DocType::Spec),
    ("test-variants", DocType::TestVariant),
    ("tests", DocType::TestVariant),
    ("templates", DocType::Template),
];

impl TypeInference for PathInference {
    fn name(&self) -> &'static str {
        "path"
    }

    fn infer(&self, ctx: &TypeContext<'_>, registry: &DocTypeRegistry) -> Option<DocType> {
        let lower = ctx.path.to_ascii_lowercase();
        let file_name = lower.rsplit('/').next().unwrap_or(&lower);
        let inferred = if file_name == "prd.md" {
            Some(DocType::Prd)
        } else {
            lower
                .split('/')
                .rev()
                .skip(1)
                .find_map(|segment| {
                    PATH_SEGMENTS
                        .iter()
                        .find(|(name, _)| *name == segment)
                        .map(|(_, ty)| *ty)
                })
        };
        inferred.filter(|ty| registry.schema(*ty).is_some())
    }
}

/// Ordered inference strategies; the first one that answers wins.
pub struct TypeInferenceChain {
    strategies: Vec<Box<dyn TypeInference>>,
}

impl Default for TypeInferenceChain {
    fn default() -> Self {
        Self {
            strategies: vec![
                Box::new(FrontmatterTypeInference),
                Box::new(IdPrefixInference),
                Box::new(PathInference),
            ],
        }
    }
}

impl TypeInferenceChain {
    #[must_use]
    pub fn infer(&self, ctx: &TypeContext<'_>, registry: &DocTypeRegistry) -> DocType {
        for strategy in &self.strategies {
            if let Some(ty) = strategy.infer(ctx, registry) {
                log::trace!("{}: type {ty} via {}", ctx.path, strategy.name());
                return ty;
            }
        }
        DocType::Undetermined
    }
}
