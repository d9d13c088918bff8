//! Single-pass tokenizer: walks a [`Cursor`] once and populates an
//! [`AstStore`] with a flat tree (§4.2).
//!
//! Containers are tracked with an explicit work stack of open [`Frame`]s
//! rather than recursive calls, so nesting depth is governed entirely by
//! [`Config::max_nesting_depth`] and a pathological input cannot exhaust the
//! Rust call stack regardless of that limit.

use crate::ast::{flags, AstStore, NodeId, NodeKind};
use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::hash::polynomial_hash;

enum Frame {
    Object {
        node: NodeId,
        last_field: Option<NodeId>,
        field_count: usize,
        /// Set once a field's name has been parsed and `:` consumed; the
        /// field is not attached to the object's sibling chain until its
        /// value (leaf, or eventually a popped container) is known.
        pending: Option<(NodeId, NodeId)>,
        at: usize,
    },
    Array {
        node: NodeId,
        last_child: Option<NodeId>,
        element_count: usize,
        at: usize,
    },
}

/// Tokenize a complete JSON value out of `cursor`, resetting and
/// repopulating `ast`. Returns the root node's id.
pub(crate) fn tokenize(
    ast: &mut AstStore,
    cursor: &Cursor<'_>,
    config: &Config,
) -> Result<NodeId, ParseError> {
    ast.reset();
    let len = cursor.length();
    let mut pos = skip_ws(cursor, 0)?;
    if pos >= len {
        return Err(ParseError::Empty);
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut root = None;

    if let Some(leaf) = start_value(ast, cursor, &mut pos, &mut stack, config)? {
        root = Some(leaf);
    }

    while !stack.is_empty() {
        if let Some(finished) = step(ast, cursor, &mut pos, &mut stack, config)? {
            root = Some(finished);
        }
    }

    let root = root.expect("tokenizer invariant: a root value was always produced");
    pos = skip_ws(cursor, pos)?;
    if pos != len {
        return Err(ParseError::TrailingGarbage { at: pos });
    }
    Ok(root)
}

/// Advance the top-of-stack frame by exactly one field/element (or close
/// it). Returns `Some(node)` only when the *outermost* container closes.
fn step(
    ast: &mut AstStore,
    cursor: &Cursor<'_>,
    pos: &mut usize,
    stack: &mut Vec<Frame>,
    config: &Config,
) -> Result<Option<NodeId>, ParseError> {
    *pos = skip_ws(cursor, *pos)?;
    let byte = peek(cursor, *pos)?;

    let is_object = matches!(stack.last().unwrap(), Frame::Object { .. });
    if is_object {
        let has_fields = match stack.last().unwrap() {
            Frame::Object { last_field, .. } => last_field.is_some(),
            _ => unreachable!(),
        };

        if byte == b'}' && !has_fields {
            *pos += 1;
            let node = match stack.last().unwrap() {
                Frame::Object { node, .. } => *node,
                _ => unreachable!(),
            };
            return finish_container(ast, stack, node);
        }
        if has_fields {
            if byte != b',' {
                return Err(ParseError::Unexpected { byte, at: *pos });
            }
            *pos += 1;
            *pos = skip_ws(cursor, *pos)?;
        }

        let name_start = *pos;
        if peek(cursor, *pos)? != b'"' {
            return Err(ParseError::Unexpected {
                byte: peek(cursor, *pos)?,
                at: *pos,
            });
        }
        let name = parse_string(ast, cursor, pos, config, /*is_field_name=*/ true)?;
        *pos = skip_ws(cursor, *pos)?;
        if peek(cursor, *pos)? != b':' {
            return Err(ParseError::Unexpected {
                byte: peek(cursor, *pos)?,
                at: *pos,
            });
        }
        *pos += 1;
        *pos = skip_ws(cursor, *pos)?;

        let field = ast.push(NodeKind::Field, name_start as u32, name_start as u32, 0, 0);
        ast.set_first_child(field, name);
        match stack.last_mut().unwrap() {
            Frame::Object { pending, field_count, at, .. } => {
                *field_count += 1;
                if *field_count > config.max_object_fields() {
                    return Err(ParseError::ObjectTooLarge {
                        at: *at,
                        limit: config.max_object_fields(),
                    });
                }
                *pending = Some((field, name));
            }
            _ => unreachable!(),
        }

        if let Some(leaf) = start_value(ast, cursor, pos, stack, config)? {
            return attach_leaf(ast, stack, leaf);
        }
        Ok(None)
    } else {
        let has_children = match stack.last().unwrap() {
            Frame::Array { last_child, .. } => last_child.is_some(),
            _ => unreachable!(),
        };

        if byte == b']' && !has_children {
            *pos += 1;
            let node = match stack.last().unwrap() {
                Frame::Array { node, .. } => *node,
                _ => unreachable!(),
            };
            return finish_container(ast, stack, node);
        }
        if has_children {
            match byte {
                b']' => {
                    *pos += 1;
                    let node = match stack.last().unwrap() {
                        Frame::Array { node, .. } => *node,
                        _ => unreachable!(),
                    };
                    return finish_container(ast, stack, node);
                }
                b',' => {
                    *pos += 1;
                    *pos = skip_ws(cursor, *pos)?;
                }
                _ => return Err(ParseError::Unexpected { byte, at: *pos }),
            }
        }

        match stack.last_mut().unwrap() {
            Frame::Array { element_count, at, .. } => {
                *element_count += 1;
                if *element_count > config.max_array_elements() {
                    return Err(ParseError::ArrayTooLarge {
                        at: *at,
                        limit: config.max_array_elements(),
                    });
                }
            }
            _ => unreachable!(),
        }

        if let Some(leaf) = start_value(ast, cursor, pos, stack, config)? {
            return attach_leaf(ast, stack, leaf);
        }
        Ok(None)
    }
}

/// Attempt to start parsing a value at `*pos`. Leaves (string/number/
/// true/false/null) are parsed to completion and returned as `Some`;
/// containers push a new [`Frame`] and return `None` -- the eventual
/// `finish_container` call attaches them once they close.
fn start_value(
    ast: &mut AstStore,
    cursor: &Cursor<'_>,
    pos: &mut usize,
    stack: &mut Vec<Frame>,
    config: &Config,
) -> Result<Option<NodeId>, ParseError> {
    let at = *pos;
    let byte = peek(cursor, at)?;
    match byte {
        b'{' => {
            *pos += 1;
            let node = ast.push(NodeKind::Object, at as u32, at as u32, 0, 0);
            push_frame(
                stack,
                Frame::Object {
                    node,
                    last_field: None,
                    field_count: 0,
                    pending: None,
                    at,
                },
                config,
                at,
            )?;
            Ok(None)
        }
        b'[' => {
            *pos += 1;
            let node = ast.push(NodeKind::Array, at as u32, at as u32, 0, 0);
            push_frame(
                stack,
                Frame::Array {
                    node,
                    last_child: None,
                    element_count: 0,
                    at,
                },
                config,
                at,
            )?;
            Ok(None)
        }
        b'"' => Ok(Some(parse_string(ast, cursor, pos, config, false)?)),
        b'-' | b'0'..=b'9' => Ok(Some(parse_number(ast, cursor, pos, config)?)),
        b't' => Ok(Some(parse_literal(ast, cursor, pos, b"true", NodeKind::True)?)),
        b'f' => Ok(Some(parse_literal(ast, cursor, pos, b"false", NodeKind::False)?)),
        b'n' => Ok(Some(parse_literal(ast, cursor, pos, b"null", NodeKind::Null)?)),
        _ => Err(ParseError::Unexpected { byte, at }),
    }
}

fn push_frame(
    stack: &mut Vec<Frame>,
    frame: Frame,
    config: &Config,
    at: usize,
) -> Result<(), ParseError> {
    if stack.len() + 1 > config.max_nesting_depth() {
        return Err(ParseError::NestingTooDeep {
            at,
            limit: config.max_nesting_depth(),
        });
    }
    stack.push(frame);
    Ok(())
}

/// Attach a just-completed leaf value to whatever frame is on top of the
/// stack (an object's pending field, or an array element). Never reports a
/// completed root on its own -- only `finish_container` does, since a leaf
/// can only complete a field/element, never close a container by itself.
fn attach_leaf(
    ast: &mut AstStore,
    stack: &mut Vec<Frame>,
    leaf: NodeId,
) -> Result<Option<NodeId>, ParseError> {
    match stack.last_mut().unwrap() {
        Frame::Object { last_field, pending, node, .. } => {
            let (field, name) = pending.take().expect("object frame expects a pending field");
            ast.set_next_sibling(name, leaf);
            match *last_field {
                None => ast.set_first_child(*node, field),
                Some(prev) => ast.set_next_sibling(prev, field),
            }
            *last_field = Some(field);
        }
        Frame::Array { last_child, node, .. } => match *last_child {
            None => {
                ast.set_first_child(*node, leaf);
                *last_child = Some(leaf);
            }
            Some(prev) => {
                ast.set_next_sibling(prev, leaf);
                *last_child = Some(leaf);
            }
        },
    }
    Ok(None)
}

/// Pop the top frame (now closed) and either attach it to the new top frame,
/// or -- if the stack is now empty -- report it as the parsed root.
fn finish_container(
    ast: &mut AstStore,
    stack: &mut Vec<Frame>,
    node: NodeId,
) -> Result<Option<NodeId>, ParseError> {
    stack.pop();
    if stack.is_empty() {
        Ok(Some(node))
    } else {
        attach_leaf(ast, stack, node)
    }
}

#[inline]
fn peek(cursor: &Cursor<'_>, pos: usize) -> Result<u8, ParseError> {
    cursor
        .byte_at(pos)
        .map_err(|_| ParseError::UnterminatedContainer { at: pos })
}

#[inline]
fn skip_ws(cursor: &Cursor<'_>, mut pos: usize) -> Result<usize, ParseError> {
    let len = cursor.length();
    while pos < len {
        match cursor.byte_at(pos).unwrap() {
            b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
            _ => break,
        }
    }
    Ok(pos)
}

fn parse_literal(
    ast: &mut AstStore,
    cursor: &Cursor<'_>,
    pos: &mut usize,
    text: &[u8],
    kind: NodeKind,
) -> Result<NodeId, ParseError> {
    let at = *pos;
    let len = cursor.length();
    if at + text.len() > len {
        return Err(ParseError::UnterminatedLiteral { at });
    }
    for (i, &expected) in text.iter().enumerate() {
        let actual = cursor
            .byte_at(at + i)
            .map_err(|_| ParseError::UnterminatedLiteral { at })?;
        if actual != expected {
            return Err(ParseError::Unexpected { byte: actual, at: at + i });
        }
    }
    *pos = at + text.len();
    Ok(ast.push(kind, at as u32, *pos as u32, 0, 0))
}

fn parse_number(
    ast: &mut AstStore,
    cursor: &Cursor<'_>,
    pos: &mut usize,
    config: &Config,
) -> Result<NodeId, ParseError> {
    let start = *pos;
    let len = cursor.length();
    let mut i = start;

    // A required digit run came up empty: if input ran out before any digit
    // could appear, the number is unterminated; otherwise some other byte
    // sits where a digit was required, which is simply malformed.
    let empty_digit_run = |i: usize| -> ParseError {
        if i >= len {
            ParseError::UnterminatedNumber { at: start }
        } else {
            ParseError::InvalidNumber { at: start }
        }
    };

    if i < len && cursor.byte_at(i).unwrap() == b'-' {
        i += 1;
    }
    let digits_start = i;
    while i < len && cursor.byte_at(i).unwrap().is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return Err(empty_digit_run(i));
    }
    if cursor.byte_at(digits_start).unwrap() == b'0' && i - digits_start > 1 {
        return Err(ParseError::InvalidNumber { at: start });
    }

    let mut is_float = false;
    if i < len && cursor.byte_at(i).unwrap() == b'.' {
        is_float = true;
        i += 1;
        let frac_start = i;
        while i < len && cursor.byte_at(i).unwrap().is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return Err(empty_digit_run(i));
        }
    }
    if i < len && matches!(cursor.byte_at(i).unwrap(), b'e' | b'E') {
        is_float = true;
        i += 1;
        if i < len && matches!(cursor.byte_at(i).unwrap(), b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < len && cursor.byte_at(i).unwrap().is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return Err(empty_digit_run(i));
        }
    }

    if i - start > config.max_number_bytes() {
        return Err(ParseError::NumberTooLong {
            at: start,
            limit: config.max_number_bytes(),
        });
    }

    *pos = i;
    let flag = if is_float { flags::NUMBER_FLOAT } else { 0 };
    Ok(ast.push(NodeKind::Number, start as u32, i as u32, flag, 0))
}

fn parse_string(
    ast: &mut AstStore,
    cursor: &Cursor<'_>,
    pos: &mut usize,
    config: &Config,
    is_field_name: bool,
) -> Result<NodeId, ParseError> {
    let quote_at = *pos;
    debug_assert_eq!(cursor.byte_at(quote_at).unwrap(), b'"');
    let len = cursor.length();
    let mut i = quote_at + 1;
    let interior_start = i;
    let mut escaped = false;

    loop {
        if i >= len {
            return Err(ParseError::UnterminatedString { at: quote_at });
        }
        let b = cursor.byte_at(i).unwrap();
        match b {
            b'"' => break,
            b'\\' => {
                escaped = true;
                let esc_at = i;
                i += 1;
                if i >= len {
                    return Err(ParseError::UnterminatedString { at: quote_at });
                }
                let esc = cursor.byte_at(i).unwrap();
                match esc {
                    b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {
                        i += 1;
                    }
                    b'u' => {
                        i += 1;
                        for _ in 0..4 {
                            if i >= len || !cursor.byte_at(i).unwrap().is_ascii_hexdigit() {
                                return Err(ParseError::InvalidUnicodeEscape { at: esc_at });
                            }
                            i += 1;
                        }
                    }
                    _ => return Err(ParseError::InvalidEscape { at: esc_at }),
                }
            }
            0x00..=0x1F => return Err(ParseError::Unexpected { byte: b, at: i }),
            _ => i += 1,
        }
        if i - interior_start > config.max_string_bytes() {
            return Err(ParseError::StringTooLong {
                at: quote_at,
                limit: config.max_string_bytes(),
            });
        }
    }
    let interior_end = i;
    *pos = i + 1; // consume closing quote

    let flag = if escaped { flags::STRING_ESCAPED } else { 0 };
    let hash = if is_field_name {
        let raw = cursor
            .slice(interior_start, interior_end - interior_start)
            .map_err(|_| ParseError::UnterminatedString { at: quote_at })?;
        polynomial_hash(raw.as_bytes())
    } else {
        0
    };
    Ok(ast.push(
        NodeKind::String,
        interior_start as u32,
        interior_end as u32,
        flag,
        hash,
    ))
}
