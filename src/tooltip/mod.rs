//! Tooltip presentation for annotated spans.
//!
//! The annotated markup carries the definition in [`TIP_ATTR`]; a host page
//! feeds pointer events into a [`Presenter`] and positions the floating
//! element with [`place`].

use crate::{Annotation, Config};

pub const TIP_ATTR: &str = "data-tip";
pub const TIP_POS_ATTR: &str = "data-tip-pos";

/// Space between the anchor and the tooltip, in CSS pixels.
const GAP: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Below,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub side: Side,
    pub x: f64,
    pub y: f64,
}

impl Placement {
    /// Value for [`TIP_POS_ATTR`]; below is the default and needs none.
    pub fn position_attr(&self) -> Option<&'static str> {
        match self.side {
            Side::Above => Some("top"),
            Side::Below => None,
        }
    }
}

/// Position a tooltip of `size` next to `anchor`. It goes below unless the
/// anchor sits within `flip_threshold` of the viewport bottom.
pub fn place(anchor: Rect, size: Size, viewport: Viewport, flip_threshold: f64) -> Placement {
    let side = if viewport.height - anchor.bottom() < flip_threshold {
        Side::Above
    } else {
        Side::Below
    };

    let y = match side {
        Side::Below => anchor.bottom() + GAP,
        Side::Above => (anchor.top - GAP - size.height).max(0.0),
    };

    let centered = anchor.left + (anchor.width - size.width) / 2.0;
    let x = centered.min(viewport.width - size.width).max(0.0);

    Placement { side, x, y }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    HoverEnter(usize),
    HoverLeave(usize),
    Touch(usize),
    TouchOutside,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tooltip<'a> {
    pub anchor: usize,
    pub text: &'a str,
}

/// Show/hide state for the tooltips of one page. Span ids index the
/// definitions the presenter was built with.
#[derive(Debug, Clone)]
pub struct Presenter {
    definitions: Vec<String>,
    visible: Option<usize>,
    flip_threshold: f64,
}

impl Presenter {
    pub fn new(definitions: Vec<String>, flip_threshold: f64) -> Self {
        Self {
            definitions,
            visible: None,
            flip_threshold,
        }
    }

    pub fn from_annotations(annotations: &[Annotation], config: &Config) -> Self {
        Self::new(
            annotations.iter().map(|a| a.definition.clone()).collect(),
            config.flip_threshold,
        )
    }

    /// Where the visible tooltip goes, given its anchor's box.
    pub fn place(&self, anchor: Rect, size: Size, viewport: Viewport) -> Option<Placement> {
        self.visible
            .map(|_| place(anchor, size, viewport, self.flip_threshold))
    }

    pub fn handle(&mut self, event: Event) -> Option<Tooltip<'_>> {
        match event {
            Event::HoverEnter(id) if id < self.definitions.len() => self.visible = Some(id),
            Event::HoverLeave(id) if self.visible == Some(id) => self.visible = None,
            Event::Touch(id) if id < self.definitions.len() => {
                self.visible = if self.visible == Some(id) {
                    None
                } else {
                    Some(id)
                };
            }
            Event::TouchOutside | Event::Scroll => self.visible = None,
            _ => {}
        }
        self.visible()
    }

    pub fn visible(&self) -> Option<Tooltip<'_>> {
        self.visible.map(|id| Tooltip {
            anchor: id,
            text: &self.definitions[id],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };
    const TIP: Size = Size {
        width: 200.0,
        height: 50.0,
    };

    #[test]
    fn test_places_below_by_default() {
        let anchor = Rect::new(300.0, 100.0, 40.0, 20.0);
        let p = place(anchor, TIP, VIEWPORT, 120.0);

        assert_eq!(p.side, Side::Below);
        assert_eq!(p.y, 126.0);
        assert_eq!(p.x, 220.0);
        assert_eq!(p.position_attr(), None);
    }

    #[test]
    fn test_flips_near_bottom() {
        // 600 - 500 = 100 < 120
        let anchor = Rect::new(300.0, 480.0, 40.0, 20.0);
        let p = place(anchor, TIP, VIEWPORT, 120.0);

        assert_eq!(p.side, Side::Above);
        assert_eq!(p.y, 480.0 - 6.0 - 50.0);
        assert_eq!(p.position_attr(), Some("top"));

        // exactly at the threshold stays below
        let anchor = Rect::new(300.0, 460.0, 40.0, 20.0);
        assert_eq!(place(anchor, TIP, VIEWPORT, 120.0).side, Side::Below);
    }

    #[test]
    fn test_clamps_horizontally() {
        let left_edge = place(Rect::new(0.0, 10.0, 20.0, 20.0), TIP, VIEWPORT, 120.0);
        assert_eq!(left_edge.x, 0.0);

        let right_edge = place(Rect::new(790.0, 10.0, 10.0, 20.0), TIP, VIEWPORT, 120.0);
        assert_eq!(right_edge.x, 600.0);
    }

    #[test]
    fn test_hover_shows_and_leave_hides() {
        let mut presenter = Presenter::new(vec!["A".into(), "B".into()], 120.0);

        let shown = presenter.handle(Event::HoverEnter(1)).unwrap();
        assert_eq!(shown.text, "B");
        assert_eq!(shown.anchor, 1);

        // leaving some other span changes nothing
        assert!(presenter.handle(Event::HoverLeave(0)).is_some());
        assert!(presenter.handle(Event::HoverLeave(1)).is_none());
    }

    #[test]
    fn test_touch_toggles_and_outside_hides() {
        let mut presenter = Presenter::new(vec!["A".into(), "B".into()], 120.0);

        assert_eq!(presenter.handle(Event::Touch(0)).unwrap().text, "A");
        assert_eq!(presenter.handle(Event::Touch(1)).unwrap().text, "B");
        assert!(presenter.handle(Event::Touch(1)).is_none());

        presenter.handle(Event::Touch(0));
        assert!(presenter.handle(Event::TouchOutside).is_none());

        presenter.handle(Event::HoverEnter(0));
        assert!(presenter.handle(Event::Scroll).is_none());
    }

    #[test]
    fn test_presenter_from_annotations() {
        let annotations = crate::Annotator::new(
            &crate::Glossary::new(vec![crate::Term::new(&["hit"], "A")]),
            &Config::default(),
        )
        .annotate_html("<p>hit</p>")
        .annotations;
        let config = Config {
            flip_threshold: 300.0,
            ..Default::default()
        };
        let mut presenter = Presenter::from_annotations(&annotations, &config);
        let anchor = Rect::new(10.0, 350.0, 20.0, 20.0);

        assert!(presenter.place(anchor, TIP, VIEWPORT).is_none());
        assert_eq!(presenter.handle(Event::HoverEnter(0)).unwrap().text, "A");
        // 600 - 370 = 230 < 300
        assert_eq!(
            presenter.place(anchor, TIP, VIEWPORT).unwrap().side,
            Side::Above
        );
    }

    #[test]
    fn test_unknown_span_is_ignored() {
        let mut presenter = Presenter::new(vec!["A".into()], 120.0);
        assert!(presenter.handle(Event::HoverEnter(7)).is_none());
        assert!(presenter.handle(Event::Touch(7)).is_none());
    }
}
