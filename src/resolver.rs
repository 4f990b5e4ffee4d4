use std::collections::HashMap;

use log::debug;

use crate::{convert::TypeFieldCache, error::CompileError, schema::FieldType, sink::PredicateSink};

/// A dotted path resolved against a sink.
pub struct ResolvedPath<S: PredicateSink> {
    pub field: S::Field,
    /// Entity type owning the terminal field
    pub owner_type: String,
    pub field_name: String,
    pub field_type: FieldType,
    /// Joins traversed, one per relationship segment
    pub joins: Vec<S::Join>,
}

/// Resolves dotted attribute paths into join chains.
///
/// Joins are cached by dotted prefix (`x`, `x.y`, ...) for the lifetime of
/// the resolver, which is one compilation: two predicates under `x.y` share
/// the joins for `x` and `x.y`.
pub struct PathResolver<J> {
    joins: HashMap<String, J>,
}

impl<J: Clone> Default for PathResolver<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J: Clone> PathResolver<J> {
    pub fn new() -> Self {
        PathResolver {
            joins: HashMap::new(),
        }
    }

    /// Number of distinct joins created so far.
    pub fn join_count(&self) -> usize {
        self.joins.len()
    }

    pub fn resolve<S>(
        &mut self,
        sink: &mut S,
        field_types: &TypeFieldCache,
        path: &str,
    ) -> Result<ResolvedPath<S>, CompileError>
    where
        S: PredicateSink<Join = J>,
    {
        let unresolved = |segment: &str| CompileError::SchemaResolution {
            path: path.to_string(),
            segment: segment.to_string(),
        };

        let segments: Vec<&str> = path.split('.').collect();
        let Some((&terminal, relations)) = segments.split_last() else {
            return Err(unresolved(path));
        };

        let mut context = sink.root();
        let mut prefix = String::new();
        let mut chain = Vec::with_capacity(relations.len());

        for &segment in relations {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);

            context = match self.joins.get(&prefix) {
                Some(join) => join.clone(),
                None => {
                    let join = sink.join(&context, segment).ok_or_else(|| unresolved(segment))?;
                    debug!("joined '{prefix}'");
                    self.joins.insert(prefix.clone(), join.clone());
                    join
                }
            };
            chain.push(context.clone());
        }

        let field = sink.field(&context, terminal).ok_or_else(|| unresolved(terminal))?;
        let owner_type = sink.entity_type(&context);
        let field_type = field_types
            .lookup(sink.schema(), &owner_type, terminal)
            .ok_or_else(|| unresolved(terminal))?;

        Ok(ResolvedPath {
            field,
            owner_type,
            field_name: terminal.to_string(),
            field_type,
            joins: chain,
        })
    }
}
