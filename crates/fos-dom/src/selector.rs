//! Selector matching for querySelector / querySelectorAll
//!
//! Supports compound selectors (`tag`, `*`, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, `[attr~=value]`), descendant and child combinators, and
//! comma-separated groups.

use crate::{DomError, DomResult, DomTree, ElementData, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
    Includes(String, String),
}

/// One compound selector (no combinators)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    /// Check the compound against one element
    pub fn matches(&self, el: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attrs.get_attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| match a {
            AttrMatch::Exists(name) => el.get_attr(name).is_some(),
            AttrMatch::Equals(name, value) => el.get_attr(name).as_deref() == Some(value.as_str()),
            AttrMatch::Includes(name, value) => el
                .get_attr(name)
                .is_some_and(|v| v.split_whitespace().any(|t| t == value)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    /// Rightmost compound last; each entry's combinator links it to the
    /// entry before it
    parts: Vec<(Combinator, Compound)>,
}

/// Parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
        {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.chars[start..self.pos].iter().collect())
    }

    fn error(&self, what: &str) -> DomError {
        let src: String = self.chars.iter().collect();
        DomError::Syntax(format!("{what} at offset {} in '{src}'", self.pos))
    }
}

impl SelectorList {
    /// Parse a selector string
    pub fn parse(input: &str) -> DomResult<Self> {
        let mut cur = Cursor {
            chars: input.chars().collect(),
            pos: 0,
        };
        let mut selectors = Vec::new();

        loop {
            cur.skip_ws();
            selectors.push(Self::parse_complex(&mut cur)?);
            cur.skip_ws();
            match cur.bump() {
                None => break,
                Some(',') => continue,
                Some(_) => return Err(cur.error("unexpected character")),
            }
        }
        Ok(Self { selectors })
    }

    fn parse_complex(cur: &mut Cursor) -> DomResult<Complex> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;

        loop {
            let compound = Self::parse_compound(cur)?;
            parts.push((combinator, compound));

            let had_ws = cur.skip_ws();
            match cur.peek() {
                None | Some(',') => break,
                Some('>') => {
                    cur.bump();
                    cur.skip_ws();
                    combinator = Combinator::Child;
                }
                Some(_) if had_ws => combinator = Combinator::Descendant,
                Some(_) => return Err(cur.error("unexpected character")),
            }
        }
        Ok(Complex { parts })
    }

    fn parse_compound(cur: &mut Cursor) -> DomResult<Compound> {
        let mut compound = Compound::default();
        let mut any = false;

        if cur.peek() == Some('*') {
            cur.bump();
            any = true;
        } else if let Some(tag) = cur.ident() {
            compound.tag = Some(tag.to_ascii_lowercase());
            any = true;
        }

        loop {
            match cur.peek() {
                Some('#') => {
                    cur.bump();
                    compound.id = Some(cur.ident().ok_or_else(|| cur.error("expected id"))?);
                }
                Some('.') => {
                    cur.bump();
                    let class = cur.ident().ok_or_else(|| cur.error("expected class name"))?;
                    compound.classes.push(class);
                }
                Some('[') => {
                    cur.bump();
                    compound.attrs.push(Self::parse_attr(cur)?);
                }
                _ => break,
            }
            any = true;
        }

        if !any {
            return Err(cur.error("expected selector"));
        }
        Ok(compound)
    }

    fn parse_attr(cur: &mut Cursor) -> DomResult<AttrMatch> {
        cur.skip_ws();
        let name = cur
            .ident()
            .ok_or_else(|| cur.error("expected attribute name"))?
            .to_ascii_lowercase();
        cur.skip_ws();

        let includes = match cur.bump() {
            Some(']') => return Ok(AttrMatch::Exists(name)),
            Some('=') => false,
            Some('~') if cur.bump() == Some('=') => true,
            _ => return Err(cur.error("expected ']' or '='")),
        };

        cur.skip_ws();
        let value = match cur.peek() {
            Some(q @ ('"' | '\'')) => {
                cur.bump();
                let mut value = String::new();
                loop {
                    match cur.bump() {
                        Some(c) if c == q => break,
                        Some(c) => value.push(c),
                        None => return Err(cur.error("unterminated string")),
                    }
                }
                value
            }
            _ => cur.ident().ok_or_else(|| cur.error("expected attribute value"))?,
        };
        cur.skip_ws();
        if cur.bump() != Some(']') {
            return Err(cur.error("expected ']'"));
        }

        Ok(if includes {
            AttrMatch::Includes(name, value)
        } else {
            AttrMatch::Equals(name, value)
        })
    }

    /// Check whether an element matches any selector in the list
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|s| Self::matches_from(tree, id, &s.parts))
    }

    fn matches_from(tree: &DomTree, id: NodeId, parts: &[(Combinator, Compound)]) -> bool {
        let Some(((combinator, last), rest)) = parts.split_last() else {
            return true;
        };
        let Some(el) = tree.element(id) else {
            return false;
        };
        if !last.matches(el) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        match combinator {
            Combinator::Child => tree
                .parent_element(id)
                .is_some_and(|p| Self::matches_from(tree, p, rest)),
            Combinator::Descendant => {
                let mut ancestor = tree.parent_element(id);
                while let Some(a) = ancestor {
                    if Self::matches_from(tree, a, rest) {
                        return true;
                    }
                    ancestor = tree.parent_element(a);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(attrs: &[(&str, &str)]) -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let section = tree.create_element("section");
        let button = tree.create_element("button");
        tree.append_child(tree.root(), section).unwrap();
        tree.append_child(section, button).unwrap();
        let el = tree.element_mut(button).unwrap();
        for (k, v) in attrs {
            el.attrs.set_attribute(k, v).unwrap();
        }
        (tree, section, button)
    }

    #[test]
    fn test_parse_variants() {
        for src in ["div", "*", "#main", ".a.b", "input[type=text]", "a[rel~='x']", "ul > li", "p, span"] {
            assert!(SelectorList::parse(src).is_ok(), "failed to parse {src}");
        }
        for src in ["", ".", "#", "div[", "a[b=", "!x", "a,"] {
            assert!(SelectorList::parse(src).is_err(), "accepted {src}");
        }
    }

    #[test]
    fn test_compound_matching() {
        let (tree, _, button) = tree_with(&[("id", "go"), ("class", "btn primary"), ("type", "submit")]);

        let ok = ["button", "#go", ".btn", ".btn.primary", "button#go.btn", "[type]", "[type=submit]", "[class~=primary]"];
        for src in ok {
            let sel = SelectorList::parse(src).unwrap();
            assert!(sel.matches(&tree, button), "{src} should match");
        }
        for src in ["div", "#stop", ".btn.secondary", "[type=reset]"] {
            let sel = SelectorList::parse(src).unwrap();
            assert!(!sel.matches(&tree, button), "{src} should not match");
        }
    }

    #[test]
    fn test_combinators() {
        let (tree, section, button) = tree_with(&[]);

        assert!(SelectorList::parse("section button").unwrap().matches(&tree, button));
        assert!(SelectorList::parse("section > button").unwrap().matches(&tree, button));
        assert!(!SelectorList::parse("button section").unwrap().matches(&tree, section));
        assert!(!SelectorList::parse("div button").unwrap().matches(&tree, button));
        assert!(SelectorList::parse("div, button").unwrap().matches(&tree, button));
    }
}
