//! End-to-end build: SVG text in, artifact pair and summary out, verified by
//! reading the binary back.

use pretty_assertions::assert_eq;
use smida::{build_font, compile_font, dom::Document, BuildOptions};
use write_fonts::read::{FontRef, TableProvider};

static LETTERING_SHEET: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1400 900">
  <g transform="translate(600.4, 1.2)">
    <path d="M 10 50 C 150 50 150 350 10 350 Z"/>
  </g>
  <g transform="translate(0, 0)">
    <path d="M 10 50 L 210 50 L 210 350 L 10 350 Z"/>
  </g>
  <g transform="translate(1.5, 448)">
    <path d="M 20 60 Q 120 10 220 60 L 220 260 L 20 260 Z"/>
  </g>
</svg>"#;

fn options() -> BuildOptions {
    let mut options = BuildOptions::new("Test Font");
    options.characters = Some(vec!['A', 'B', 'c']);
    options
}

#[test]
fn builds_an_artifact_pair() {
    let document = Document::parse(LETTERING_SHEET).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let artifacts = build_font(&document, &options(), dir.path()).unwrap();

    assert_eq!(
        artifacts.ttf_path.file_name().unwrap(),
        "Test_Font_Regular.ttf"
    );
    let ttf = std::fs::read(&artifacts.ttf_path).unwrap();
    let otf = std::fs::read(&artifacts.otf_path).unwrap();
    // the second artifact duplicates the first's bytes
    assert_eq!(ttf, otf);

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&artifacts.summary_path).unwrap()).unwrap();
    assert_eq!(summary["font_name"], "Test Font");
    assert_eq!(summary["style"], "Regular");
    assert_eq!(summary["success"], 3);
    assert_eq!(summary["failed"], 0);
    assert_eq!(summary["characters"][0], "A");

    let font = FontRef::new(&ttf).unwrap();
    // .notdef, A, B, c, space
    assert_eq!(font.maxp().unwrap().num_glyphs(), 5);
    let cmap = font.cmap().unwrap();
    // rows quantize to 0 and 450: A and B share the top row (A at x 0,
    // B at x 600.4), c sits alone below
    assert_eq!(cmap.map_codepoint('A').unwrap().to_u32(), 1);
    assert_eq!(cmap.map_codepoint('B').unwrap().to_u32(), 2);
    assert_eq!(cmap.map_codepoint('c').unwrap().to_u32(), 3);
    assert_eq!(cmap.map_codepoint(' ').unwrap().to_u32(), 4);

    let head = font.head().unwrap();
    assert_eq!(head.units_per_em(), 1000);
    let hhea = font.hhea().unwrap();
    assert_eq!(hhea.ascender().to_i16(), 800);
    assert_eq!(hhea.descender().to_i16(), -200);
    assert_eq!(hhea.number_of_long_metrics(), 5);

    let hmtx = font.hmtx().unwrap();
    let advances: Vec<u16> = hmtx.h_metrics().iter().map(|m| m.advance()).collect();
    assert_eq!(advances[0], 500); // .notdef
    assert_eq!(advances[4], 250); // space
    // drawn glyphs carry their scaled width plus side padding
    assert!(advances[1] > 250 && advances[2] > 250 && advances[3] > 250);
}

#[test]
fn builds_are_idempotent() {
    let document = Document::parse(LETTERING_SHEET).unwrap();
    let first = compile_font(&document, &options()).unwrap();
    let second = compile_font(&document, &options()).unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn bold_italic_styles_the_name_and_weight() {
    let document = Document::parse(LETTERING_SHEET).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut options = options();
    options.bold = true;
    options.italic = true;
    let artifacts = build_font(&document, &options, dir.path()).unwrap();
    assert_eq!(artifacts.summary.style, "Bold Italic");
    assert_eq!(
        artifacts.ttf_path.file_name().unwrap(),
        "Test_Font_Bold_Italic.ttf"
    );

    let bytes = std::fs::read(&artifacts.ttf_path).unwrap();
    let font = FontRef::new(&bytes).unwrap();
    assert_eq!(font.os2().unwrap().us_weight_class(), 700);
}
