//! GPX track writer.
//!
//! Emits a GPX 1.1 document holding a single named track with one track
//! segment, which is what route planners and bike computers import.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

use crate::segment::Coordinate;
use crate::traits::TrackSink;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

pub struct GpxWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> GpxWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 2),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn start(&mut self, element: BytesStart) -> io::Result<()> {
        self.writer.write_event(Event::Start(element))
    }

    fn end(&mut self, name: &str) -> io::Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))
    }
}

impl<W: Write> TrackSink for GpxWriter<W> {
    fn write_track(&mut self, name: &str, points: &[Coordinate]) -> io::Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.start(BytesStart::new("gpx").with_attributes([
            ("version", "1.1"),
            ("creator", "segment-tour"),
            ("xmlns", GPX_NAMESPACE),
        ]))?;
        self.start(BytesStart::new("trk"))?;
        self.start(BytesStart::new("name"))?;
        self.writer.write_event(Event::Text(BytesText::new(name)))?;
        self.end("name")?;
        self.start(BytesStart::new("trkseg"))?;

        for point in points {
            let lat = point.lat.to_string();
            let lon = point.lng.to_string();
            self.writer
                .write_event(Event::Empty(BytesStart::new("trkpt").with_attributes([
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                ])))?;
        }

        self.end("trkseg")?;
        self.end("trk")?;
        self.end("gpx")?;
        self.writer.get_mut().flush()?;
        debug!(points = points.len(), "wrote GPX track");
        Ok(())
    }
}
