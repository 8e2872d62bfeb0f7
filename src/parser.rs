use crate::core::{Language, SourceFile};
use std::path::PathBuf;
use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

/// Typed per-file parse failure. Parsing never panics; a file that cannot
/// produce a tree at all maps to one of these variants and contributes no
/// structural findings. `Syntax` is raised only by [`parse_strict`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported language for {path}")]
    UnsupportedLanguage { path: PathBuf },
    #[error("failed to load grammar for {path}: {reason}")]
    Grammar { path: PathBuf, reason: String },
    #[error("parser produced no tree for {path}")]
    NoTree { path: PathBuf },
    #[error("syntax errors in {path}")]
    Syntax { path: PathBuf },
}

/// A parsed file: the tree plus its own copy of the source it indexes into.
#[derive(Debug)]
pub struct SourceTree {
    tree: Tree,
    source: String,
    path: PathBuf,
    language: Language,
}

impl SourceTree {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// True when tree-sitter recovered from at least one syntax error. The
    /// tree is still usable; traversals skip the `ERROR` subtrees and
    /// analyze the well-formed rest.
    pub fn has_syntax_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

/// Parse one source file. Parsing is error-tolerant: a file with syntax
/// errors still yields a tree whose unparseable spans are `ERROR` nodes,
/// so one malformed function does not erase findings for its well-formed
/// siblings. Callers that refuse partial input use [`parse_strict`].
pub fn parse(file: &SourceFile) -> Result<SourceTree, ParseError> {
    let language = Language::from_path(&file.path);
    let grammar = match language {
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Language::Unknown => {
            return Err(ParseError::UnsupportedLanguage {
                path: file.path.clone(),
            })
        }
    };

    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| ParseError::Grammar {
            path: file.path.clone(),
            reason: e.to_string(),
        })?;

    let tree = parser
        .parse(&file.content, None)
        .ok_or_else(|| ParseError::NoTree {
            path: file.path.clone(),
        })?;

    Ok(SourceTree {
        tree,
        source: file.content.clone(),
        path: file.path.clone(),
        language,
    })
}

/// Parse and reject any file with a syntax error, however local. The
/// analyzers never use this; it serves callers that need the whole file to
/// be well-formed.
pub fn parse_strict(file: &SourceFile) -> Result<SourceTree, ParseError> {
    let tree = parse(file)?;
    if tree.has_syntax_errors() {
        return Err(ParseError::Syntax {
            path: file.path.clone(),
        });
    }
    Ok(tree)
}

/// Parse, logging failures as warnings through the injected logging facade.
/// This is the per-file isolation boundary: analyzers call this, treat
/// `None` as "no structural findings for this file", and get a recovered
/// tree (with its `ERROR` spans) when the file is only partially malformed.
pub fn parse_or_warn(file: &SourceFile) -> Option<SourceTree> {
    match parse(file) {
        Ok(tree) => {
            if tree.has_syntax_errors() {
                log::warn!(
                    "syntax errors in {}; analyzing recovered nodes",
                    file.path.display()
                );
            }
            Some(tree)
        }
        Err(ParseError::UnsupportedLanguage { .. }) => None,
        Err(e) => {
            log::warn!("failed to parse {}: {e}", file.path.display());
            None
        }
    }
}
