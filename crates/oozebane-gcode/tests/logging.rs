//! Structured fields of the per-job summary line

use oozebane_gcode::Skein;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_summary_logs_extrusion_width() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();

    let job = "(<extrusionWidth> 0.45 )\n(<extrusionStart> )\nG1 X0 Y0\nM101\nG1 X10 Y0\nM103\n";
    tracing::subscriber::with_default(subscriber, || Skein::default().process(job));

    let logged = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    let summary = logged
        .lines()
        .find(|line| line.contains("Oozebane finished"))
        .unwrap();
    assert!(summary.contains("extrusion_width=0.45"), "{}", summary);
    assert!(summary.contains("early_offs=1"), "{}", summary);
}
