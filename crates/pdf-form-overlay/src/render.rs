//! Overlay rendering: one page per layout page, one text widget per field.

use crate::constants::{
    ANNOT_FLAG_PRINT, DEBUG_BORDER_WIDTH, DEFAULT_FONT, DEFAULT_FONT_SIZE, mm_to_pt,
};
use crate::error::Result;
use crate::grid::{GridConfig, generate_grid};
use crate::options::OverlayOptions;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, text_string};
use pdf_form_layout::{Color, FieldFlag, ResolvedField, ResolvedLayout};
use std::collections::BTreeMap;

/// Standard Type1 fonts registered in the document, keyed by base font name.
#[derive(Debug, Default)]
struct FontResources {
    fonts: BTreeMap<String, (String, ObjectId)>,
}

impl FontResources {
    /// Resource name for `base_font`, adding the font object on first use.
    fn register(&mut self, doc: &mut Document, base_font: &str) -> String {
        if let Some((resource, _)) = self.fonts.get(base_font) {
            return resource.clone();
        }
        let resource = format!("F{}", self.fonts.len() + 1);
        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(base_font.as_bytes().to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        self.fonts
            .insert(base_font.to_string(), (resource.clone(), font_id));
        resource
    }

    fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        for (resource, font_id) in self.fonts.values() {
            dict.set(resource.as_bytes().to_vec(), Object::Reference(*font_id));
        }
        dict
    }
}

/// Effective widget styling after defaults and debug overrides.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WidgetStyle {
    pub font_name: String,
    pub font_size: f32,
    pub border_width: f32,
    pub border_color: Color,
    pub fill_color: Color,
}

impl WidgetStyle {
    pub(crate) fn for_field(field: &ResolvedField, debug: bool) -> Self {
        let font_name = if field.font_name.is_empty() {
            DEFAULT_FONT.to_string()
        } else {
            field.font_name.clone()
        };
        let font_size = if field.font_size > 0.0 {
            field.font_size
        } else {
            DEFAULT_FONT_SIZE
        };
        let (border_width, border_color) = if debug {
            (DEBUG_BORDER_WIDTH, Color::RED)
        } else {
            (
                field.border_width.unwrap_or(0.0),
                field.border_color.unwrap_or(Color::BLACK),
            )
        };

        Self {
            font_name,
            font_size,
            border_width,
            border_color,
            fill_color: field.fill_color.unwrap_or(Color::Transparent),
        }
    }
}

fn color_array(color: Color) -> Option<Object> {
    color
        .components()
        .map(|c| Object::Array(c.iter().map(|&v| Object::Real(v)).collect()))
}

/// Normal appearance: background fill then border, in widget space.
fn appearance_stream(width: f32, height: f32, style: &WidgetStyle) -> Stream {
    let mut ops = String::new();
    if let Some([r, g, b]) = style.fill_color.components() {
        ops.push_str(&format!("{} {} {} rg 0 0 {} {} re f\n", r, g, b, width, height));
    }
    if style.border_width > 0.0 {
        if let Some([r, g, b]) = style.border_color.components() {
            let inset = style.border_width / 2.0;
            ops.push_str(&format!(
                "{} w {} {} {} RG {} {} {} {} re S\n",
                style.border_width,
                r,
                g,
                b,
                inset,
                inset,
                width - style.border_width,
                height - style.border_width
            ));
        }
    }

    let dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Form".to_vec())),
        (
            "BBox",
            Object::Array(vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(width),
                Object::Real(height),
            ]),
        ),
    ]);
    Stream::new(dict, ops.into_bytes())
}

/// Build the merged field/widget dictionary for one field.
fn widget_dictionary(
    doc: &mut Document,
    field: &ResolvedField,
    style: &WidgetStyle,
    font_resource: &str,
    page_id: ObjectId,
) -> Dictionary {
    let x = mm_to_pt(field.x);
    let y = mm_to_pt(field.y);
    let width = mm_to_pt(field.w);
    let height = mm_to_pt(field.h);

    let mut widget = Dictionary::new();
    widget.set("Type", Object::Name(b"Annot".to_vec()));
    widget.set("Subtype", Object::Name(b"Widget".to_vec()));
    widget.set("FT", Object::Name(b"Tx".to_vec()));
    widget.set("T", text_string(&field.name));
    if !field.tooltip.is_empty() {
        widget.set("TU", text_string(&field.tooltip));
    }
    widget.set(
        "Rect",
        Object::Array(vec![
            Object::Real(x),
            Object::Real(y),
            Object::Real(x + width),
            Object::Real(y + height),
        ]),
    );
    widget.set("F", Object::Integer(ANNOT_FLAG_PRINT));
    widget.set("P", Object::Reference(page_id));

    let flags = FieldFlag::combine(&field.flags);
    if flags != 0 {
        widget.set("Ff", Object::Integer(i64::from(flags)));
    }
    if field.maxlen > 0 {
        widget.set("MaxLen", Object::Integer(i64::from(field.maxlen)));
    }
    widget.set(
        "DA",
        Object::string_literal(format!("/{} {} Tf 0 g", font_resource, style.font_size)),
    );

    let mut characteristics = Dictionary::new();
    if let Some(border) = color_array(style.border_color) {
        characteristics.set("BC", border);
    }
    if let Some(background) = color_array(style.fill_color) {
        characteristics.set("BG", background);
    }
    widget.set("MK", Object::Dictionary(characteristics));
    widget.set(
        "BS",
        Object::Dictionary(Dictionary::from_iter(vec![
            ("W", Object::Real(style.border_width)),
            ("S", Object::Name(b"S".to_vec())),
        ])),
    );

    let appearance_id = doc.add_object(appearance_stream(width, height, style));
    widget.set(
        "AP",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "N",
            Object::Reference(appearance_id),
        )])),
    );
    widget
}

/// Render a resolved layout into a standalone interactive document.
pub fn render_overlay(layout: &ResolvedLayout, options: &OverlayOptions) -> Result<Document> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let (page_width_mm, page_height_mm) = options.paper_size.dimensions_mm();
    let (page_width, page_height) = options.paper_size.dimensions_pt();

    let mut fonts = FontResources::default();
    let mut page_refs = Vec::with_capacity(layout.page_count());
    let mut field_refs = Vec::new();

    for fields in layout.pages() {
        let page_id = doc.new_object_id();

        let mut annots = Vec::with_capacity(fields.len());
        for field in fields {
            let style = WidgetStyle::for_field(field, options.debug);
            let font_resource = fonts.register(&mut doc, &style.font_name);
            let widget = widget_dictionary(&mut doc, field, &style, &font_resource, page_id);
            let widget_id = doc.add_object(widget);
            annots.push(Object::Reference(widget_id));
            field_refs.push(Object::Reference(widget_id));
        }

        let mut page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page_width),
                    Object::Real(page_height),
                ]),
            ),
            ("Annots", Object::Array(annots)),
        ]);

        let mut resources = Dictionary::new();
        let mut content = String::new();
        if options.grid {
            let label_font = fonts.register(&mut doc, DEFAULT_FONT);
            content.push_str(&generate_grid(
                &GridConfig::for_page(page_width_mm, page_height_mm),
                &label_font,
            ));
            resources.set("Font", Object::Dictionary(fonts.to_dictionary()));
        }
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));

        doc.objects.insert(page_id, Object::Dictionary(page_dict));
        page_refs.push(Object::Reference(page_id));
    }

    let page_count = page_refs.len() as i64;
    let field_count = field_refs.len();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(page_count)),
        ])),
    );

    let default_font = fonts.register(&mut doc, DEFAULT_FONT);
    let acro_form = Dictionary::from_iter(vec![
        ("Fields", Object::Array(field_refs)),
        ("NeedAppearances", Object::Boolean(true)),
        (
            "DA",
            Object::string_literal(format!("/{} {} Tf 0 g", default_font, DEFAULT_FONT_SIZE)),
        ),
        (
            "DR",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "Font",
                Object::Dictionary(fonts.to_dictionary()),
            )])),
        ),
    ]);
    let acro_form_id = doc.add_object(acro_form);

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
        ("AcroForm", Object::Reference(acro_form_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    log::info!(
        "Rendered overlay: {} page(s), {} field(s)",
        page_count,
        field_count
    );
    Ok(doc)
}
