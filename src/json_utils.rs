use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// Type of a JSON node found by the structure scanner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
}

/// Coordinates of a JSON structure within a larger text, including nested children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjCoords {
    pub start: usize,
    pub end: usize, // inclusive index of the closing bracket/brace
    pub kind: NodeType,
    pub children: Vec<ObjCoords>,
}

impl ObjCoords {
    pub fn new(start: usize, end: usize, kind: NodeType, children: Vec<ObjCoords>) -> Self {
        Self { start, end, kind, children }
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..=self.end]
    }
}

#[derive(Debug)]
struct Frame {
    start: usize,
    kind: NodeType,
    children: Vec<ObjCoords>,
}

/// Remove a surrounding markdown code fence (```` ```json ```` or bare ```` ``` ````).
pub fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // drop the info string ("json", "JSON", ...) up to the first newline
        s = match rest.find('\n') {
            Some(nl) => &rest[nl + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Find all JSON object/array structures in the given text. Coordinates are byte indices.
#[instrument(target = "quiz_generator::json", skip(text))]
pub fn find_json_structures(text: &str) -> Vec<ObjCoords> {
    let bytes = text.as_bytes();
    let mut results: Vec<ObjCoords> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let closing = match b {
            b'"' => {
                in_string = true;
                None
            }
            b'{' => {
                stack.push(Frame { start: i, kind: NodeType::Object, children: Vec::new() });
                None
            }
            b'[' => {
                stack.push(Frame { start: i, kind: NodeType::Array, children: Vec::new() });
                None
            }
            b'}' => Some(NodeType::Object),
            b']' => Some(NodeType::Array),
            _ => None,
        };

        if let Some(kind) = closing {
            // Unbalanced closers are dropped along with their frame.
            if let Some(frame) = stack.pop() {
                if frame.kind == kind {
                    let node = ObjCoords::new(frame.start, i, kind, frame.children);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => results.push(node),
                    }
                }
            }
        }
    }

    debug!(target: "quiz_generator::json", count = results.len(), "found root structures");
    results
}

/// Every object that parses when reading starts at a `{` in `text`, in order
/// of position.
///
/// Unlike [`find_json_structures`] this keeps no string state across the
/// text, so a stray quote in surrounding prose cannot hide an object.
fn objects_at_each_brace(text: &str) -> impl Iterator<Item = serde_json::Map<String, Value>> + '_ {
    text.match_indices('{').filter_map(move |(i, _)| {
        match serde_json::Deserializer::from_str(&text[i..]).into_iter::<Value>().next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

/// First JSON object in `text` (depth-first, outermost first) that contains `key`.
///
/// Falls back to a parse attempt at every `{` when the structural scan finds
/// no match, which happens when prose before the JSON has an unpaired quote.
#[instrument(target = "quiz_generator::json", skip(text), fields(text_len = text.len()))]
pub fn find_object_with_key(text: &str, key: &str) -> Option<Value> {
    fn visit(text: &str, node: &ObjCoords, key: &str) -> Option<Value> {
        if node.kind == NodeType::Object {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(node.slice(text)) {
                if map.contains_key(key) {
                    return Some(Value::Object(map));
                }
            }
        }
        node.children.iter().find_map(|child| visit(text, child, key))
    }

    if let Some(found) = find_json_structures(text).iter().find_map(|root| visit(text, root, key)) {
        return Some(found);
    }
    let found = objects_at_each_brace(text).find(|map| map.contains_key(key)).map(Value::Object);
    if found.is_some() {
        debug!(target: "quiz_generator::json", key, "object found by brace fallback");
    }
    found
}

/// Extract the first `T` from a model reply.
///
/// Strategy (in order):
/// - strip code fences and try the whole text;
/// - otherwise scan for JSON structures and try each node, outermost first,
///   descending into children when a node does not deserialize;
/// - finally try every object that parses from a `{` onwards.
#[instrument(target = "quiz_generator::json", skip(text), fields(text_len = text.len()))]
pub fn extract_first<T: DeserializeOwned>(text: &str) -> Option<T> {
    let cleaned = strip_code_fences(text);
    if let Ok(v) = serde_json::from_str::<T>(cleaned) {
        return Some(v);
    }

    fn visit<T: DeserializeOwned>(text: &str, node: &ObjCoords) -> Option<T> {
        if let Ok(v) = serde_json::from_str::<T>(node.slice(text)) {
            return Some(v);
        }
        node.children.iter().find_map(|child| visit::<T>(text, child))
    }

    find_json_structures(cleaned)
        .iter()
        .find_map(|root| visit::<T>(cleaned, root))
        .or_else(|| objects_at_each_brace(cleaned).find_map(|map| serde_json::from_value(Value::Object(map)).ok()))
}
