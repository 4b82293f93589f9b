//! Assembling glyphs, metrics and naming into a binary font.
//!
//! This is the outermost layer of the pipeline: it runs collection, layout
//! and rasterization, then hands the resulting tables to
//! [`write_fonts::FontBuilder`] for binary packing.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;
use write_fonts::{
    dump_table,
    read::{tables::head::MacStyle, tables::os2::SelectionFlags, TopLevelTable},
    tables::{
        cmap::Cmap,
        glyf::{Bbox, Glyf, GlyfLocaBuilder, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::Loca,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
    },
    types::{FWord, Fixed, GlyphId, NameId, Tag, UfWord},
    FontBuilder, OtRound,
};

use crate::collect::collect_shapes;
use crate::dom::Document;
use crate::error::BuildError;
use crate::glyph::{
    draw_glyph, placeholder_glyph, FALLBACK_ADVANCE, NOTDEF_ADVANCE, SPACE_ADVANCE,
};
use crate::layout::{assign_characters, sort_reading_order};
use crate::metrics::{self, FontMetrics};

/// Characters assigned to discovered shapes, in reading order, when the
/// caller does not supply a sequence of its own.
pub const DEFAULT_CHAR_ORDER: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', //
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', //
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', //
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', //
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', //
    '.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '-', '_', //
    '/', '\\', '@', '#', '$', '%', '&', '*', '+', '=', ' ', //
    'Ç', 'Ğ', 'İ', 'Ö', 'Ş', 'Ü', //
    'ç', 'ğ', 'ı', 'ö', 'ş', 'ü',
];

/// What to build and how to style it.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    pub family_name: String,
    /// Characters to assign to shapes in reading order;
    /// [`DEFAULT_CHAR_ORDER`] when `None`.
    pub characters: Option<Vec<char>>,
    pub bold: bool,
    pub italic: bool,
    pub units_per_em: u16,
}

impl BuildOptions {
    pub fn new(family_name: impl Into<String>) -> BuildOptions {
        BuildOptions {
            family_name: family_name.into(),
            characters: None,
            bold: false,
            italic: false,
            units_per_em: metrics::UNITS_PER_EM,
        }
    }
}

/// Machine-readable coverage record written next to the artifacts.
///
/// `total`/`success`/`failed` tally the characters that had a shape to draw
/// (the space is excluded; it is always an empty glyph). `characters` lists
/// everything present in the character map, placeholders included.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildSummary {
    pub font_name: String,
    pub style: String,
    pub total: u32,
    pub success: u32,
    pub failed: u32,
    pub characters: Vec<char>,
}

/// An assembled font plus its coverage summary, not yet written anywhere.
#[derive(Clone, Debug)]
pub struct CompiledFont {
    pub bytes: Vec<u8>,
    pub summary: BuildSummary,
}

/// The artifacts a successful [`build_font`] call leaves on disk.
#[derive(Clone, Debug)]
pub struct BuildArtifacts {
    pub ttf_path: PathBuf,
    pub otf_path: PathBuf,
    pub summary_path: PathBuf,
    pub summary: BuildSummary,
}

struct Style {
    name: &'static str,
    weight: u16,
    selection: SelectionFlags,
    mac_style: MacStyle,
}

fn resolve_style(bold: bool, italic: bool) -> Style {
    match (bold, italic) {
        (true, true) => Style {
            name: "Bold Italic",
            weight: 700,
            selection: SelectionFlags::BOLD | SelectionFlags::ITALIC,
            mac_style: MacStyle::BOLD | MacStyle::ITALIC,
        },
        (true, false) => Style {
            name: "Bold",
            weight: 700,
            selection: SelectionFlags::BOLD,
            mac_style: MacStyle::BOLD,
        },
        (false, true) => Style {
            name: "Italic",
            weight: 400,
            selection: SelectionFlags::ITALIC,
            mac_style: MacStyle::ITALIC,
        },
        (false, false) => Style {
            name: "Regular",
            weight: 400,
            selection: SelectionFlags::REGULAR,
            mac_style: MacStyle::empty(),
        },
    }
}

fn glyph_name(ch: char) -> String {
    if ch == ' ' {
        "space".to_string()
    } else {
        format!("uni{:04X}", ch as u32)
    }
}

struct GlyphRecord {
    name: String,
    glyph: SimpleGlyph,
    advance: u16,
}

/// Compiles a font in memory.
///
/// Fails only on fatal conditions (no shapes at all, or a table that cannot
/// be compiled); characters whose geometry cannot be drawn get placeholder
/// glyphs and are tallied in the summary.
pub fn compile_font(
    document: &Document,
    options: &BuildOptions,
) -> Result<CompiledFont, BuildError> {
    debug!("source view box {:?}", document.view_box());
    let shapes = collect_shapes(document.root());
    info!("discovered {} candidate shapes", shapes.len());
    if shapes.is_empty() {
        return Err(BuildError::NoShapes);
    }
    let shapes = sort_reading_order(shapes);

    let characters: Vec<char> = options
        .characters
        .clone()
        .unwrap_or_else(|| DEFAULT_CHAR_ORDER.to_vec());
    let assignments = assign_characters(shapes, &characters);
    let assigned = assignments.iter().filter(|(_, s)| s.is_some()).count();
    info!("assigned {assigned} of {} requested characters", characters.len());

    let font_metrics = FontMetrics::new(
        options.units_per_em,
        assignments
            .iter()
            .filter_map(|(ch, shape)| shape.as_ref().map(|shape| (*ch, shape))),
    );

    let mut records = vec![GlyphRecord {
        name: ".notdef".to_string(),
        glyph: placeholder_glyph(),
        advance: NOTDEF_ADVANCE,
    }];
    let mut mappings: Vec<(char, GlyphId)> = Vec::with_capacity(assignments.len() + 1);
    let mut covered = Vec::with_capacity(assignments.len());
    let mut success = 0u32;
    let mut failed = 0u32;
    let mut have_space = false;

    for (ch, shape) in &assignments {
        let gid = GlyphId::new(records.len() as u32);
        let (glyph, advance) = if *ch == ' ' {
            have_space = true;
            (placeholder_glyph(), SPACE_ADVANCE)
        } else if let Some(shape) = shape {
            match draw_glyph(shape, &font_metrics) {
                Ok(drawn) => {
                    success += 1;
                    drawn
                }
                Err(e) => {
                    warn!("could not draw '{ch}': {e}");
                    failed += 1;
                    (placeholder_glyph(), FALLBACK_ADVANCE)
                }
            }
        } else {
            debug!("no shape for '{ch}', using a placeholder");
            (placeholder_glyph(), FALLBACK_ADVANCE)
        };
        records.push(GlyphRecord {
            name: glyph_name(*ch),
            glyph,
            advance,
        });
        mappings.push((*ch, gid));
        covered.push(*ch);
    }
    if !have_space {
        mappings.push((' ', GlyphId::new(records.len() as u32)));
        records.push(GlyphRecord {
            name: "space".to_string(),
            glyph: placeholder_glyph(),
            advance: SPACE_ADVANCE,
        });
        covered.push(' ');
    }
    info!("{success} glyphs drawn, {failed} substituted");

    let style = resolve_style(options.bold, options.italic);
    let bytes = assemble(&records, &mappings, &font_metrics, &options.family_name, &style)?;

    Ok(CompiledFont {
        bytes,
        summary: BuildSummary {
            font_name: options.family_name.clone(),
            style: style.name.to_string(),
            total: success + failed,
            success,
            failed,
            characters: covered,
        },
    })
}

fn assemble(
    records: &[GlyphRecord],
    mappings: &[(char, GlyphId)],
    font_metrics: &FontMetrics,
    family_name: &str,
    style: &Style,
) -> Result<Vec<u8>, BuildError> {
    let mut glyf_builder = GlyfLocaBuilder::new();
    for record in records {
        glyf_builder.add_glyph(&record.glyph)?;
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    // font-wide extents over the compiled outlines
    let bounds = records
        .iter()
        .map(|r| r.glyph.bbox)
        .reduce(Bbox::union)
        .unwrap_or_default();
    let min_rsb = records
        .iter()
        .map(|r| r.advance as i16 - r.glyph.bbox.x_max)
        .min()
        .unwrap_or(0);
    let advance_width_max = records.iter().map(|r| r.advance).max().unwrap_or(0);

    let head = Head {
        font_revision: Fixed::from_f64(1.0),
        units_per_em: font_metrics.units_per_em,
        x_min: bounds.x_min,
        y_min: bounds.y_min,
        x_max: bounds.x_max,
        y_max: bounds.y_max,
        mac_style: style.mac_style,
        lowest_rec_ppem: 8,
        index_to_loc_format: loca_format as i16,
        ..Default::default()
    };

    let hhea = Hhea {
        ascender: FWord::new(font_metrics.ascender),
        descender: FWord::new(font_metrics.descender),
        line_gap: FWord::new(metrics::LINE_GAP),
        advance_width_max: UfWord::new(advance_width_max),
        min_left_side_bearing: FWord::new(bounds.x_min),
        min_right_side_bearing: FWord::new(min_rsb),
        x_max_extent: FWord::new(bounds.x_max),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: records.len() as u16,
    };

    let hmtx = Hmtx {
        h_metrics: records
            .iter()
            .map(|r| LongMetric {
                advance: r.advance,
                side_bearing: 0,
            })
            .collect(),
        left_side_bearings: Vec::new(),
    };

    let maxp = Maxp {
        num_glyphs: records.len() as u16,
        ..Default::default()
    };

    let mut sorted_mappings = mappings.to_vec();
    sorted_mappings.sort_by_key(|(ch, _)| *ch);
    let first_char = sorted_mappings.first().map(|(ch, _)| *ch as u32).unwrap_or(0);
    let last_char = sorted_mappings.last().map(|(ch, _)| *ch as u32).unwrap_or(0);
    let cmap = Cmap::from_mappings(sorted_mappings)?;

    let advance_total: u32 = records.iter().map(|r| r.advance as u32).sum();
    let os2 = Os2 {
        x_avg_char_width: (advance_total as f64 / records.len() as f64).ot_round(),
        us_weight_class: style.weight,
        fs_type: 0,
        ach_vend_id: Tag::new(b"CSTM"),
        fs_selection: style.selection,
        us_first_char_index: first_char.min(0xFFFF) as u16,
        us_last_char_index: last_char.min(0xFFFF) as u16,
        s_typo_ascender: font_metrics.ascender,
        s_typo_descender: font_metrics.descender,
        s_typo_line_gap: metrics::LINE_GAP,
        us_win_ascent: font_metrics.ascender as u16,
        us_win_descent: font_metrics.descender.unsigned_abs(),
        ul_unicode_range_1: 0x8000_00FF,
        // write-fonts 0.46 requires these to be present (Some) for the
        // OS/2 version implied by the version-2+ fields below; present-but-zero
        // satisfies validation without declaring any code pages.
        ul_code_page_range_1: Some(0),
        ul_code_page_range_2: Some(0),
        sx_height: Some(metrics::X_HEIGHT),
        s_cap_height: Some(metrics::CAP_HEIGHT),
        us_default_char: Some(0),
        us_break_char: Some(32),
        us_max_context: Some(0),
        ..Default::default()
    };

    let name = name_table(family_name, style);
    let post = post_table(records);

    let mut builder = FontBuilder::new();
    builder.add_raw(Glyf::TAG, dump_table(&glyf)?);
    builder.add_raw(Loca::TAG, dump_table(&loca)?);
    builder.add_raw(Head::TAG, dump_table(&head)?);
    builder.add_raw(Hhea::TAG, dump_table(&hhea)?);
    builder.add_raw(Hmtx::TAG, dump_table(&hmtx)?);
    builder.add_raw(Maxp::TAG, dump_table(&maxp)?);
    builder.add_raw(Cmap::TAG, dump_table(&cmap)?);
    builder.add_raw(Os2::TAG, dump_table(&os2)?);
    builder.add_raw(Name::TAG, dump_table(&name)?);
    builder.add_raw(Post::TAG, dump_table(&post)?);
    Ok(builder.build())
}

fn name_table(family_name: &str, style: &Style) -> Name {
    let full_name = format!("{family_name} {}", style.name);
    let unique_id = format!("{family_name}-{}", style.name);
    let postscript_name = unique_id.replace(' ', "");
    let mut name = Name::default();
    for (id, value) in [
        (NameId::FAMILY_NAME, family_name.to_string()),
        (NameId::SUBFAMILY_NAME, style.name.to_string()),
        (NameId::UNIQUE_ID, unique_id),
        (NameId::FULL_NAME, full_name),
        (NameId::VERSION_STRING, "Version 1.000".to_string()),
        (NameId::POSTSCRIPT_NAME, postscript_name),
    ] {
        name.name_record.push(NameRecord::new(3, 1, 0x409, id, value.into()));
    }
    name.name_record.sort();
    name
}

fn post_table(records: &[GlyphRecord]) -> Post {
    let mut post = Post::new_v2(records.iter().map(|r| r.name.as_str()));
    post.underline_position = FWord::new(-100);
    post.underline_thickness = FWord::new(50);
    post
}

fn artifact_stem(family_name: &str, style_name: &str) -> String {
    let safe_family = Regex::new(r"\W").unwrap().replace_all(family_name, "_");
    format!("{safe_family}_{}", style_name.replace(' ', "_"))
}

/// Builds the font and writes the artifact pair plus the summary sidecar
/// into `output_dir`.
///
/// The second artifact duplicates the first's bytes under the `.otf`
/// extension; no distinct CFF encoding is produced.
pub fn build_font(
    document: &Document,
    options: &BuildOptions,
    output_dir: &Path,
) -> Result<BuildArtifacts, BuildError> {
    let compiled = compile_font(document, options)?;
    fs::create_dir_all(output_dir)?;

    let stem = artifact_stem(&options.family_name, &compiled.summary.style);
    let ttf_path = output_dir.join(format!("{stem}.ttf"));
    let otf_path = output_dir.join(format!("{stem}.otf"));
    let summary_path = output_dir.join(format!("{stem}_mapping.json"));

    fs::write(&ttf_path, &compiled.bytes)?;
    fs::write(&otf_path, &compiled.bytes)?;
    fs::write(&summary_path, serde_json::to_vec_pretty(&compiled.summary)?)?;
    info!("wrote {}", ttf_path.display());
    info!("wrote {}", otf_path.display());

    Ok(BuildArtifacts {
        ttf_path,
        otf_path,
        summary_path,
        summary: compiled.summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use write_fonts::read::{FontRef, TableProvider};

    fn two_shape_doc() -> Document {
        Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1200 400">
                 <g transform="translate(600, 0)"><path d="M 10 50 C 150 50 150 350 10 350 Z"/></g>
                 <g transform="translate(0, 0)"><path d="M 10 50 L 210 50 L 210 350 L 10 350 Z"/></g>
               </svg>"#,
        )
        .unwrap()
    }

    #[test]
    fn style_resolution() {
        let bold = resolve_style(true, false);
        assert_eq!(bold.name, "Bold");
        assert_eq!(bold.weight, 700);
        assert_eq!(bold.selection, SelectionFlags::BOLD);
        assert!(!bold.selection.contains(SelectionFlags::ITALIC));

        let italic = resolve_style(false, true);
        assert_eq!((italic.name, italic.weight), ("Italic", 400));
        assert_eq!(italic.selection, SelectionFlags::ITALIC);

        let both = resolve_style(true, true);
        assert_eq!((both.name, both.weight), ("Bold Italic", 700));
        assert!(both.selection.contains(SelectionFlags::BOLD | SelectionFlags::ITALIC));

        let regular = resolve_style(false, false);
        assert_eq!((regular.name, regular.weight), ("Regular", 400));
        assert_eq!(regular.selection, SelectionFlags::REGULAR);
        assert_eq!(regular.mac_style, MacStyle::empty());
    }

    #[test]
    fn glyph_names() {
        assert_eq!(glyph_name(' '), "space");
        assert_eq!(glyph_name('A'), "uni0041");
        assert_eq!(glyph_name('ı'), "uni0131");
    }

    #[test]
    fn artifact_stems_are_filesystem_safe() {
        assert_eq!(artifact_stem("My Font!", "Bold Italic"), "My_Font__Bold_Italic");
        assert_eq!(artifact_stem("Çizgi", "Regular"), "Çizgi_Regular");
    }

    #[test]
    fn empty_document_is_fatal() {
        let doc = Document::parse("<svg><rect width=\"3\" height=\"3\"/></svg>").unwrap();
        let result = compile_font(&doc, &BuildOptions::new("Empty"));
        assert!(matches!(result, Err(BuildError::NoShapes)));
    }

    #[test]
    fn two_shapes_two_characters() {
        let mut options = BuildOptions::new("Duo");
        options.characters = Some(vec!['A', 'B']);
        let compiled = compile_font(&two_shape_doc(), &options).unwrap();
        assert_eq!(compiled.summary.success, 2);
        assert_eq!(compiled.summary.failed, 0);
        assert_eq!(compiled.summary.characters, vec!['A', 'B', ' ']);

        let font = FontRef::new(&compiled.bytes).unwrap();
        // .notdef, A, B, space
        assert_eq!(font.maxp().unwrap().num_glyphs(), 4);
        let cmap = font.cmap().unwrap();
        // the x-sorted translate offsets put A (at 0) before B (at 600)
        assert_eq!(cmap.map_codepoint('A').unwrap().to_u32(), 1);
        assert_eq!(cmap.map_codepoint('B').unwrap().to_u32(), 2);
        assert_eq!(cmap.map_codepoint(' ').unwrap().to_u32(), 3);
        assert_eq!(font.head().unwrap().units_per_em(), 1000);
        assert_eq!(font.hhea().unwrap().ascender().to_i16(), 800);
    }

    #[test]
    fn excess_characters_get_placeholder_advances() {
        let mut options = BuildOptions::new("Partial");
        options.characters = Some(vec!['A', 'B', 'C']);
        let doc = Document::parse(
            r#"<svg><g transform="translate(0, 0)">
                 <path d="M 0 0 L 100 0 L 100 100 L 0 100 Z"/>
               </g></svg>"#,
        )
        .unwrap();
        let compiled = compile_font(&doc, &options).unwrap();
        assert_eq!(compiled.summary.total, 1);
        assert_eq!(compiled.summary.success, 1);
        assert_eq!(compiled.summary.characters, vec!['A', 'B', 'C', ' ']);

        let font = FontRef::new(&compiled.bytes).unwrap();
        let hmtx = font.hmtx().unwrap();
        let metrics = hmtx.h_metrics();
        assert_eq!(metrics[0].advance(), NOTDEF_ADVANCE); // .notdef
        assert_eq!(metrics[2].advance(), FALLBACK_ADVANCE); // B
        assert_eq!(metrics[3].advance(), FALLBACK_ADVANCE); // C
        assert_eq!(metrics[4].advance(), SPACE_ADVANCE); // space
    }

    #[test]
    fn space_in_the_character_set_is_not_duplicated() {
        let mut options = BuildOptions::new("Spacey");
        options.characters = Some(vec!['A', ' ']);
        let compiled = compile_font(&two_shape_doc(), &options).unwrap();
        let font = FontRef::new(&compiled.bytes).unwrap();
        // .notdef, A, space -- the second shape is discarded, no extra space
        assert_eq!(font.maxp().unwrap().num_glyphs(), 3);
        let hmtx = font.hmtx().unwrap();
        assert_eq!(hmtx.h_metrics()[2].advance(), SPACE_ADVANCE);
        assert_eq!(
            font.cmap().unwrap().map_codepoint(' ').unwrap().to_u32(),
            2
        );
    }

    #[test]
    fn default_character_order_is_used_when_unspecified() {
        let compiled = compile_font(&two_shape_doc(), &BuildOptions::new("Default")).unwrap();
        // both shapes land on 'A' and 'B', the rest of the default order
        // falls back to placeholders
        assert_eq!(compiled.summary.total, 2);
        assert_eq!(
            compiled.summary.characters.len(),
            DEFAULT_CHAR_ORDER.len()
        );
        assert_eq!(&compiled.summary.characters[..2], &['A', 'B']);
    }
}
