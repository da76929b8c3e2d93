//! The gallery page template and its view model.

use crate::assets::Builtins;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use tracing::instrument;
use upon::{Engine, Template};

/// What a tile links to and how the client treats a click on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    /// Anchor to the original image, thumbnail inline.
    Image,
    /// Thumbnail with a play affordance; the client swaps in a player on
    /// interaction, so the original video is never fetched at render time.
    Video,
}

/// One media file as the page shows it.
#[derive(Clone, Debug)]
pub struct Tile {
    pub kind: TileKind,
    /// Display name (the source file name).
    pub name: String,
    /// URL of the original media file.
    pub source: String,
    /// URL of the cached thumbnail; `None` renders a labelled placeholder
    /// instead of an image (generation failed or was skipped).
    pub thumbnail: Option<String>,
}
impl Tile {
    fn parameters(&self) -> upon::Value {
        upon::value! {
            name: &self.name,
            source: &self.source,
            thumbnail: self.thumbnail.clone().unwrap_or_default(),
            available: self.thumbnail.is_some(),
            is_video: matches!(self.kind, TileKind::Video),
        }
    }
}

/// One collapsible date section, already in final (descending) page order.
#[derive(Clone, Debug)]
pub struct Section {
    /// Header text, normally the `YYYY-MM-DD` date label.
    pub title: String,
    /// DOM identifier for the collapse toggle; normally equal to `title`.
    pub anchor: String,
    /// Tiles in discovery order.
    pub tiles: Vec<Tile>,
}
impl Section {
    fn parameters(&self) -> upon::Value {
        upon::value! {
            title: &self.title,
            anchor: &self.anchor,
            tiles: upon::Value::List(self.tiles.iter().map(Tile::parameters).collect()),
        }
    }
}

/// Renders the gallery page from the embedded template.
///
/// Constructed once per run; compilation happens eagerly so a broken
/// template surfaces at startup rather than after all the thumbnail work.
pub struct Renderer {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl Renderer {
    pub fn new() -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let source = Builtins::load_text("templates/gallery.html")?;
        let template = engine.compile(source).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }

    /// Produce the complete HTML document.
    #[instrument(skip_all, fields(sections = sections.len()))]
    pub fn render(&self, title: impl AsRef<str>, sections: &[Section]) -> Result<String> {
        let parameters = Self::parameters(title.as_ref(), sections)?;
        self.template.render(&self.engine, parameters).to_string().or_raise(|| ErrorKind::Template)
    }

    fn parameters(title: &str, sections: &[Section]) -> Result<upon::Value> {
        let style = Builtins::load_text("styles/gallery.css")?;
        let script = Builtins::load_text("scripts/gallery.js")?;
        let sections = upon::Value::List(sections.iter().map(Section::parameters).collect());
        Ok(upon::value! {
            title: title,
            style: style,
            script: script,
            sections: sections,
        })
    }
}

/// Custom [`upon`] extensions for HTML output.
mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Minimal HTML escaping for text nodes and attribute values. Applied
    /// explicitly in the template (`{{ value | escape }}`); upon itself
    /// writes values verbatim, which is what the inlined stylesheet and
    /// script need.
    fn escape_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                for ch in s.chars() {
                    match ch {
                        '&' => f.write_str("&amp;")?,
                        '<' => f.write_str("&lt;")?,
                        '>' => f.write_str("&gt;")?,
                        '"' => f.write_str("&quot;")?,
                        '\'' => f.write_str("&#39;")?,
                        _ => f.write_char(ch)?,
                    }
                }
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Registers the `escape` formatter on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("escape", escape_formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Section> {
        vec![
            Section {
                title: "2024-02-01".to_string(),
                anchor: "2024-02-01".to_string(),
                tiles: vec![Tile {
                    kind: TileKind::Video,
                    name: "clip.mp4".to_string(),
                    source: "videos/clip.mp4".to_string(),
                    thumbnail: Some("cache/videos/clip.jpg".to_string()),
                }],
            },
            Section {
                title: "2024-01-05".to_string(),
                anchor: "2024-01-05".to_string(),
                tiles: vec![
                    Tile {
                        kind: TileKind::Image,
                        name: "beach.jpg".to_string(),
                        source: "images/beach.jpg".to_string(),
                        thumbnail: Some("cache/images/beach.jpg".to_string()),
                    },
                    Tile {
                        kind: TileKind::Image,
                        name: "broken.png".to_string(),
                        source: "images/broken.png".to_string(),
                        thumbnail: None,
                    },
                ],
            },
        ]
    }

    #[test]
    fn sections_render_in_given_order_with_date_anchors() {
        let html = Renderer::new().unwrap().render("Gallery", &sections()).unwrap();
        let february = html.find(r#"id="2024-02-01""#).unwrap();
        let january = html.find(r#"id="2024-01-05""#).unwrap();
        assert!(february < january);
        // The header carries the date as display text too.
        assert!(html.contains(">2024-01-05</h2>"));
    }

    #[test]
    fn video_tiles_defer_the_player_to_interaction() {
        let html = Renderer::new().unwrap().render("Gallery", &sections()).unwrap();
        assert!(!html.contains("<video"));
        assert!(html.contains(r#"data-source="videos/clip.mp4""#));
        assert!(html.contains(r#"src="cache/videos/clip.jpg""#));
    }

    #[test]
    fn image_tiles_link_to_the_original() {
        let html = Renderer::new().unwrap().render("Gallery", &sections()).unwrap();
        assert!(html.contains(r#"href="images/beach.jpg""#));
        assert!(html.contains(r#"src="cache/images/beach.jpg""#));
    }

    #[test]
    fn unavailable_thumbnails_render_a_placeholder() {
        let html = Renderer::new().unwrap().render("Gallery", &sections()).unwrap();
        assert!(html.contains(r#"class="missing""#));
        assert!(!html.contains(r#"src="""#));
    }

    #[test]
    fn assets_are_inlined() {
        let html = Renderer::new().unwrap().render("Gallery", &sections()).unwrap();
        assert!(html.contains("<style>"));
        assert!(html.contains("<script>"));
        assert!(html.contains("day-tiles"));
    }

    #[test]
    fn names_are_html_escaped() {
        let spicy = vec![Section {
            title: "2024-01-01".to_string(),
            anchor: "2024-01-01".to_string(),
            tiles: vec![Tile {
                kind: TileKind::Image,
                name: r#"a<b>&"q".jpg"#.to_string(),
                source: "images/weird.jpg".to_string(),
                thumbnail: None,
            }],
        }];
        let html = Renderer::new().unwrap().render("Gallery", &spicy).unwrap();
        assert!(html.contains("a&lt;b&gt;&amp;&quot;q&quot;.jpg"));
        assert!(!html.contains(r#"a<b>&"q".jpg"#));
    }

    #[test]
    fn empty_gallery_still_renders_a_document() {
        let html = Renderer::new().unwrap().render("Gallery", &[]).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(!html.contains("<section"));
    }
}
