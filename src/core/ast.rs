use tree_sitter::Node;

/// Closed classification of the tree-sitter node kinds the analyzers care
/// about. Grammar node kinds are matched once, here; every traversal is a
/// pattern match over this enum and unknown shapes fall to `Other` instead
/// of being probed speculatively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    If,
    Ternary,
    Switch,
    SwitchCase,
    Loop,
    Try,
    Catch,
    LogicalOp,
    Concat,
    Function,
    Method,
    Class,
    ClassBody,
    Field,
    Call,
    Member,
    Assignment,
    Await,
    Import,
    Export,
    StringLit,
    TemplateString,
    This,
    Other,
}

impl NodeKind {
    pub fn of(node: &Node, source: &str) -> NodeKind {
        match node.kind() {
            "if_statement" => NodeKind::If,
            "ternary_expression" => NodeKind::Ternary,
            "switch_statement" => NodeKind::Switch,
            "switch_case" => NodeKind::SwitchCase,
            "for_statement" | "for_in_statement" | "for_of_statement" | "while_statement"
            | "do_statement" => NodeKind::Loop,
            "try_statement" => NodeKind::Try,
            "catch_clause" => NodeKind::Catch,
            "binary_expression" => match operator_text(node, source) {
                "&&" | "||" => NodeKind::LogicalOp,
                "+" => NodeKind::Concat,
                _ => NodeKind::Other,
            },
            "function_declaration" | "function_expression" | "arrow_function"
            | "generator_function_declaration" | "generator_function" => NodeKind::Function,
            "method_definition" => NodeKind::Method,
            "class_declaration" => NodeKind::Class,
            // The bare `class` keyword token inside a declaration shares its
            // kind string with the class-expression node; only the named
            // node is a class.
            "class" if node.is_named() => NodeKind::Class,
            "class_body" => NodeKind::ClassBody,
            "field_definition" | "public_field_definition" => NodeKind::Field,
            "call_expression" => NodeKind::Call,
            "member_expression" => NodeKind::Member,
            "assignment_expression" | "augmented_assignment_expression" => NodeKind::Assignment,
            "await_expression" => NodeKind::Await,
            "import_statement" => NodeKind::Import,
            "export_statement" => NodeKind::Export,
            "string" => NodeKind::StringLit,
            "template_string" => NodeKind::TemplateString,
            "this" => NodeKind::This,
            _ => NodeKind::Other,
        }
    }

    /// Kinds that open a new block nesting level.
    pub fn increases_nesting(self) -> bool {
        matches!(
            self,
            NodeKind::If
                | NodeKind::Loop
                | NodeKind::Switch
                | NodeKind::Try
                | NodeKind::Catch
        )
    }

    /// Function-like kinds, including methods.
    pub fn is_function(self) -> bool {
        matches!(self, NodeKind::Function | NodeKind::Method)
    }
}

fn operator_text<'a>(node: &Node, source: &'a str) -> &'a str {
    node.child_by_field_name("operator")
        .and_then(|op| op.utf8_text(source.as_bytes()).ok())
        .unwrap_or("")
}

/// Preorder traversal with an explicit stack instead of recursion, so
/// pathological nesting cannot blow the call stack and block depth is an
/// explicit counter. The callback receives each node, its classified kind,
/// and the number of nesting constructs enclosing it (the node itself not
/// counted).
///
/// Spans tree-sitter could not parse arrive as `ERROR` or missing nodes;
/// those subtrees are skipped so well-formed siblings still get analyzed.
pub fn walk<'a, F>(root: Node<'a>, source: &str, mut visit: F)
where
    F: FnMut(Node<'a>, NodeKind, u32),
{
    let mut stack: Vec<(Node<'a>, u32)> = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if node.is_error() || node.is_missing() {
            continue;
        }
        let kind = NodeKind::of(&node, source);
        visit(node, kind, depth);

        let child_depth = depth + u32::from(kind.increases_nesting());
        let mut cursor = node.walk();
        let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
        // Reversed push keeps pops in source order.
        for child in children.into_iter().rev() {
            stack.push((child, child_depth));
        }
    }
}

/// Name at the end of a callee expression: `setTimeout` for both the bare
/// identifier and the `window.setTimeout` member form.
pub fn trailing_name<'a>(callee: &Node, source: &'a str) -> &'a str {
    match NodeKind::of(callee, source) {
        NodeKind::Member => callee
            .child_by_field_name("property")
            .map(|p| node_text(&p, source))
            .unwrap_or(""),
        _ => node_text(callee, source),
    }
}

/// Text of a node, or empty when the span is not valid UTF-8.
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// 1-based line of a node's first character.
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}
