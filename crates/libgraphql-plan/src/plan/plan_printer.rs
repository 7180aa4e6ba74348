use crate::ast;
use crate::document::SelectionSetId;
use crate::plan::CompiledOperation;
use crate::plan::DeferredFragment;
use crate::plan::IncludeCondition;
use crate::plan::SelectionSet;
use std::fmt::Write;

const INDENT: &str = "  ";

pub(crate) fn write_operation(
    w: &mut impl Write,
    operation: &CompiledOperation<'_>,
) -> std::fmt::Result {
    let operation_def = operation.operation();
    write!(w, "{}", operation_def.kind().keyword())?;
    if let Some(name) = operation_def.name() {
        write!(w, " {name}")?;
    }

    let var_defs = operation_def.variable_definitions();
    if !var_defs.is_empty() {
        write!(w, "(")?;
        for (idx, var_def) in var_defs.iter().enumerate() {
            if idx > 0 {
                write!(w, ", ")?;
            }
            write!(w, "${}: {}", var_def.name(), var_def.type_annotation())?;
            if let Some(default_value) = var_def.default_value() {
                write!(w, " = ")?;
                write_value(w, default_value)?;
            }
        }
        write!(w, ")")?;
    }

    writeln!(w, " {{")?;
    write_variants(w, operation, operation_def.selection_set(), 1)?;
    writeln!(w, "}}")
}

fn write_variants(
    w: &mut impl Write,
    operation: &CompiledOperation<'_>,
    node: SelectionSetId,
    depth: usize,
) -> std::fmt::Result {
    let Ok(variants) = operation.selection_variants(node) else {
        return Ok(());
    };

    for (type_name, selection_set) in variants.iter() {
        writeln!(w, "{}... on {type_name} {{", INDENT.repeat(depth))?;
        write_selection_set(w, operation, selection_set, depth + 1)?;
        writeln!(w, "{}}}", INDENT.repeat(depth))?;
    }
    Ok(())
}

fn write_selection_set(
    w: &mut impl Write,
    operation: &CompiledOperation<'_>,
    selection_set: &SelectionSet<'_>,
    depth: usize,
) -> std::fmt::Result {
    let indent = INDENT.repeat(depth);

    for selection in selection_set.selections() {
        write!(w, "{indent}")?;
        if selection.response_key() != selection.field_name() {
            write!(w, "{}: ", selection.response_key())?;
        }
        write!(w, "{}", selection.field_name())?;
        write_arguments(w, selection.arguments())?;
        write_include_condition(w, selection.include_condition())?;
        if selection.is_internal() {
            write!(w, " @internal")?;
        }

        match selection.child_selection_set() {
            Some(child) => {
                writeln!(w, " {{")?;
                write_variants(w, operation, child, depth + 1)?;
                writeln!(w, "{indent}}}")?;
            },
            None => writeln!(w)?,
        }
    }

    for deferred in selection_set.deferred_fragments() {
        write_deferred_fragment(w, operation, deferred, depth)?;
    }

    Ok(())
}

fn write_deferred_fragment(
    w: &mut impl Write,
    operation: &CompiledOperation<'_>,
    deferred: &DeferredFragment<'_>,
    depth: usize,
) -> std::fmt::Result {
    let indent = INDENT.repeat(depth);

    write!(w, "{indent}...")?;
    if let Some(type_condition) = deferred.type_condition() {
        write!(w, " on {type_condition}")?;
    }
    write_include_condition(w, deferred.include_condition())?;
    write!(w, " @defer")?;

    let mut defer_args = vec![];
    if let Some(variable) = deferred.if_variable() {
        defer_args.push(format!("if: ${variable}"));
    }
    if let Some(label) = deferred.label() {
        let mut quoted = String::new();
        write_string(&mut quoted, label)?;
        defer_args.push(format!("label: {quoted}"));
    }
    if !defer_args.is_empty() {
        write!(w, "({})", defer_args.join(", "))?;
    }

    writeln!(w, " {{")?;
    write_selection_set(w, operation, deferred.selection_set(), depth + 1)?;
    writeln!(w, "{indent}}}")
}

fn write_arguments(
    w: &mut impl Write,
    arguments: &[(String, ast::operation::Value)],
) -> std::fmt::Result {
    if arguments.is_empty() {
        return Ok(());
    }

    write!(w, "(")?;
    for (idx, (name, value)) in arguments.iter().enumerate() {
        if idx > 0 {
            write!(w, ", ")?;
        }
        write!(w, "{name}: ")?;
        write_value(w, value)?;
    }
    write!(w, ")")
}

fn write_include_condition(
    w: &mut impl Write,
    include_condition: &IncludeCondition,
) -> std::fmt::Result {
    match include_condition.clauses() {
        _ if !include_condition.is_conditional() => Ok(()),

        [] => write!(w, " @skip(if: true)"),

        [clause] => {
            for condition in clause.conditions() {
                let directive = if condition.is_negated() { "skip" } else { "include" };
                write!(w, " @{directive}(if: ${})", condition.variable())?;
            }
            Ok(())
        },

        clauses => {
            write!(w, " @include(anyOf: [")?;
            for (idx, clause) in clauses.iter().enumerate() {
                if idx > 0 {
                    write!(w, ", ")?;
                }
                write!(w, "\"{clause}\"")?;
            }
            write!(w, "])")
        },
    }
}

fn write_string(w: &mut impl Write, value: &str) -> std::fmt::Result {
    write!(w, "\"")?;
    for ch in value.chars() {
        match ch {
            '"' => write!(w, "\\\"")?,
            '\\' => write!(w, "\\\\")?,
            '\n' => write!(w, "\\n")?,
            '\r' => write!(w, "\\r")?,
            '\t' => write!(w, "\\t")?,
            ch if ch.is_control() => write!(w, "\\u{:04X}", ch as u32)?,
            ch => write!(w, "{ch}")?,
        }
    }
    write!(w, "\"")
}

fn write_value(w: &mut impl Write, value: &ast::operation::Value) -> std::fmt::Result {
    match value {
        // graphql-parser prints multi-line strings as block strings.
        ast::operation::Value::String(value) => write_string(w, value),
        value => write!(w, "{value}"),
    }
}
