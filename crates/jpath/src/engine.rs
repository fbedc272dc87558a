//! The evaluation engine for executing a parsed path query.
use super::ast::{PathExpression, Segment, Selector};
use serde_json::Value;

/// Selects every node matched by `expr`, in evaluation order.
///
/// Segments are applied left to right to the current node list. Within a
/// segment, selectors are applied in declared order, and object members are
/// visited in the document's key order. Descendant segments visit a node
/// before its children (pre-order).
pub fn select<'a>(expr: &PathExpression, document: &'a Value) -> Vec<&'a Value> {
    let mut current = vec![document];
    for segment in expr.segments() {
        let mut next = Vec::with_capacity(current.len());
        for node in current {
            apply_segment(segment, node, &mut next);
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }
    current
}

/// Selects the first node matched by `expr`, if any.
pub fn select_first<'a>(expr: &PathExpression, document: &'a Value) -> Option<&'a Value> {
    select(expr, document).into_iter().next()
}

fn apply_segment<'a>(segment: &Segment, node: &'a Value, out: &mut Vec<&'a Value>) {
    if segment.descendant {
        visit_descendants(&segment.selectors, node, out);
    } else {
        for selector in &segment.selectors {
            apply_selector(selector, node, out);
        }
    }
}

fn visit_descendants<'a>(selectors: &[Selector], node: &'a Value, out: &mut Vec<&'a Value>) {
    for selector in selectors {
        apply_selector(selector, node, out);
    }
    match node {
        Value::Object(map) => {
            for child in map.values() {
                visit_descendants(selectors, child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                visit_descendants(selectors, child, out);
            }
        }
        _ => {}
    }
}

fn apply_selector<'a>(selector: &Selector, node: &'a Value, out: &mut Vec<&'a Value>) {
    match (selector, node) {
        (Selector::Name(name), Value::Object(map)) => {
            if let Some(child) = map.get(name) {
                out.push(child);
            }
        }
        (Selector::Index(i), Value::Array(items)) => {
            if let Some(idx) = normalize_index(*i, items.len()) {
                out.push(&items[idx]);
            }
        }
        (Selector::Slice { start, end, step }, Value::Array(items)) => {
            for idx in slice_indices(items.len(), *start, *end, *step) {
                out.push(&items[idx]);
            }
        }
        (Selector::Wildcard, Value::Object(map)) => out.extend(map.values()),
        (Selector::Wildcard, Value::Array(items)) => out.extend(items.iter()),
        _ => {}
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if index < 0 { len + index } else { index };
    (0..len).contains(&idx).then_some(idx as usize)
}

/// Expands a slice into concrete indices. A zero step is rejected by the parser.
fn slice_indices(len: usize, start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Vec<usize> {
    let len = len as i64;
    let step = step.unwrap_or(1);
    let normalize = |i: i64| if i >= 0 { i } else { len + i };
    let mut indices = Vec::new();

    if step > 0 {
        let lower = normalize(start.unwrap_or(0)).clamp(0, len);
        let upper = normalize(end.unwrap_or(len)).clamp(0, len);
        let mut i = lower;
        while i < upper {
            indices.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    } else if step < 0 {
        let upper = normalize(start.unwrap_or(len - 1)).clamp(-1, len - 1);
        let lower = end.map(normalize).unwrap_or(-1).clamp(-1, len - 1);
        let mut i = upper;
        while lower < i {
            indices.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    }
    indices
}
