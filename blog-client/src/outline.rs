use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Left margin added per heading level below 1
pub const INDENT_PX: u32 = 20;

/// A heading whose top is at most this far from the top of the viewport counts as reached
pub const ACTIVE_THRESHOLD_PX: f64 = 150.0;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Heading {
    /// Anchor set on the rendered heading, `heading-<index>`
    pub id: String,
    pub text: String,
    pub level: u8,
}

impl Heading {
    pub fn indent_px(&self) -> u32 {
        u32::from(self.level.saturating_sub(1)) * INDENT_PX
    }
}

/// Table of contents of an article
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Outline(Vec<Heading>);

impl Outline {
    pub fn from_markdown(markdown: &str) -> Outline {
        let mut headings = Vec::new();
        let mut current: Option<(u8, String)> = None;
        for event in Parser::new(markdown) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current = Some((level as u8, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current.take() {
                        headings.push(Heading {
                            id: format!("heading-{}", headings.len()),
                            text: String::from(text.trim()),
                            level,
                        });
                    }
                }
                Event::Text(t) | Event::Code(t) => {
                    if let Some((_, text)) = &mut current {
                        text.push_str(&t);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some((_, text)) = &mut current {
                        text.push(' ');
                    }
                }
                _ => (),
            }
        }
        Outline(headings)
    }

    pub fn headings(&self) -> &[Heading] {
        &self.0
    }

    /// A single heading is not worth a sidebar
    pub fn should_show(&self) -> bool {
        self.0.len() > 1
    }
}

/// Tracks which heading of the outline is highlighted while scrolling
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScrollSpy {
    active: Option<String>,
    jumping: bool,
}

impl ScrollSpy {
    pub fn new() -> ScrollSpy {
        ScrollSpy::default()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    /// `tops` lists each heading id with its top relative to the viewport, in
    /// document order. Ignored while a jump is running.
    pub fn on_scroll<'a, I>(&mut self, tops: I) -> Option<&str>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        if !self.jumping {
            let mut first = None;
            let mut reached = None;
            for (id, top) in tops {
                first.get_or_insert(id);
                if top <= ACTIVE_THRESHOLD_PX {
                    reached = Some(id);
                }
            }
            if let Some(id) = reached.or(first) {
                self.active = Some(String::from(id));
            }
        }
        self.active()
    }

    /// A click on the outline: highlight the target right away and hold it
    /// until `end_jump`
    pub fn begin_jump(&mut self, id: &str) {
        self.active = Some(String::from(id));
        self.jumping = true;
    }

    pub fn end_jump(&mut self) {
        self.jumping = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "\
# Travel notes

Intro paragraph.

## Day `one`

### Morning

Some text.

## Day two
";

    #[test]
    fn headings_in_document_order() {
        let outline = Outline::from_markdown(ARTICLE);
        let got = outline
            .headings()
            .iter()
            .map(|h| (h.id.as_str(), h.text.as_str(), h.level, h.indent_px()))
            .collect::<Vec<_>>();
        assert_eq!(
            got,
            vec![
                ("heading-0", "Travel notes", 1, 0),
                ("heading-1", "Day one", 2, 20),
                ("heading-2", "Morning", 3, 40),
                ("heading-3", "Day two", 2, 20),
            ]
        );
        assert!(outline.should_show());
    }

    #[test]
    fn single_heading_is_hidden() {
        assert!(!Outline::from_markdown("# Only one\n\ntext").should_show());
        assert!(!Outline::from_markdown("no heading at all").should_show());
        assert!(Outline::from_markdown("").headings().is_empty());
    }

    #[test]
    fn last_reached_heading_is_active() {
        let mut spy = ScrollSpy::new();
        assert_eq!(spy.on_scroll(Vec::<(&str, f64)>::new()), None);
        let tops = [("heading-0", 300.0), ("heading-1", 600.0)];
        assert_eq!(spy.on_scroll(tops), Some("heading-0"));
        let tops = [("heading-0", -400.0), ("heading-1", 150.0), ("heading-2", 151.0)];
        assert_eq!(spy.on_scroll(tops), Some("heading-1"));
    }

    #[test]
    fn jump_holds_the_target() {
        let mut spy = ScrollSpy::new();
        spy.begin_jump("heading-3");
        assert!(spy.is_jumping());
        let tops = [("heading-0", -100.0), ("heading-3", 800.0)];
        assert_eq!(spy.on_scroll(tops), Some("heading-3"));
        spy.end_jump();
        assert_eq!(spy.active(), Some("heading-3"));
        assert_eq!(spy.on_scroll(tops), Some("heading-0"));
    }
}
