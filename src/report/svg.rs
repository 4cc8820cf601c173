use crate::core::histogram::Histogram;
use anyhow::Result;
use std::fmt::Write as FmtWrite;

pub const WIDTH: f64 = 800.0;
pub const HEIGHT: f64 = 400.0;

const LEFT: f64 = 64.0;
const RIGHT: f64 = 20.0;
const TOP: f64 = 40.0;
const BOTTOM: f64 = 48.0;

// skyblue / navy
const BAR_FILL: &str = "#87CEEB";
const BAR_EDGE: &str = "#000080";
const BAR_ALPHA: f64 = 0.7;

const X_LABEL: &str = "Counts per Time Interval";
const Y_LABEL: &str = "Frequency";

/// Axis padding on the data side, as a fraction of the data span.
const MARGIN: f64 = 0.05;

struct Frame {
    plot_w: f64,
    plot_h: f64,
    x_max: f64,
    y_max: f64,
}

impl Frame {
    fn x(&self, v: f64) -> f64 {
        LEFT + (v / self.x_max) * self.plot_w
    }

    fn y(&self, v: f64) -> f64 {
        TOP + self.plot_h - (v / self.y_max) * self.plot_h
    }
}

/// Standalone SVG document for one trial's histogram.
pub fn render(trial_id: &str, hist: &Histogram) -> Result<String> {
    let mut out = String::with_capacity(16 * 1024);
    let top_edge = hist.edges.top() as f64;
    let tallest = hist.tallest() as f64;
    let frame = Frame {
        plot_w: WIDTH - LEFT - RIGHT,
        plot_h: HEIGHT - TOP - BOTTOM,
        x_max: top_edge * (1.0 + MARGIN),
        y_max: if tallest > 0.0 {
            tallest * (1.0 + MARGIN)
        } else {
            1.0
        },
    };

    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-family=\"Arial,Helvetica,sans-serif\">",
        WIDTH, HEIGHT, WIDTH, HEIGHT
    )?;
    writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#fff\"/>",
        WIDTH, HEIGHT
    )?;

    draw_y_grid(&mut out, &frame)?;
    draw_bars(&mut out, &frame, hist)?;
    writeln!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"#333\"/>",
        LEFT, TOP, frame.plot_w, frame.plot_h
    )?;
    draw_x_bin_ticks(&mut out, &frame, hist)?;
    draw_axis_labels(&mut out, &frame)?;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"16\" fill=\"#222\" text-anchor=\"middle\">Counts for {}</text>",
        LEFT + frame.plot_w / 2.0,
        TOP - 14.0,
        escape_svg(trial_id)
    )?;
    writeln!(out, "</svg>")?;
    Ok(out)
}

fn draw_bars(out: &mut String, frame: &Frame, hist: &Histogram) -> Result<()> {
    for (i, &count) in hist.heights.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let x0 = frame.x(i as f64);
        let x1 = frame.x(i as f64 + 1.0);
        let y0 = frame.y(count as f64);
        writeln!(
            out,
            "<rect class=\"bar\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{}\" opacity=\"{}\"/>",
            x0,
            y0,
            x1 - x0,
            TOP + frame.plot_h - y0,
            BAR_FILL,
            BAR_EDGE,
            BAR_ALPHA
        )?;
    }
    Ok(())
}

/// Dashed grid lines and labels at integer-friendly Y ticks.
fn draw_y_grid(out: &mut String, frame: &Frame) -> Result<()> {
    let (start, step, count) = nice_ticks(0.0, frame.y_max, 6);
    let step = step.max(1.0);
    for i in 0..count {
        let v = start + step * i as f64;
        if v > frame.y_max + 1e-9 {
            break;
        }
        let y = frame.y(v);
        writeln!(
            out,
            "<line class=\"grid\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#bbb\" stroke-dasharray=\"4 3\"/>",
            LEFT,
            y,
            LEFT + frame.plot_w,
            y
        )?;
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#333\"/>",
            LEFT - 4.0,
            y,
            LEFT,
            y
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#333\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            LEFT - 7.0,
            y,
            fmt_tick(v)
        )?;
    }
    Ok(())
}

/// One tick per bin, centred on the bin and labelled with its lower edge.
fn draw_x_bin_ticks(out: &mut String, frame: &Frame, hist: &Histogram) -> Result<()> {
    let base = TOP + frame.plot_h;
    for edge in hist.edges.edges().take(hist.edges.bins()) {
        let x = frame.x(edge as f64 + 0.5);
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#333\"/>",
            x,
            base,
            x,
            base + 4.0
        )?;
        writeln!(
            out,
            "<text class=\"xtick\" x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#333\" text-anchor=\"middle\" dominant-baseline=\"hanging\">{}</text>",
            x,
            base + 7.0,
            edge
        )?;
    }
    Ok(())
}

fn draw_axis_labels(out: &mut String, frame: &Frame) -> Result<()> {
    let x = LEFT + frame.plot_w / 2.0;
    let y = TOP + frame.plot_h + 36.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"13\" fill=\"#222\" text-anchor=\"middle\">{}</text>",
        x, y, X_LABEL
    )?;
    let yx = LEFT - 44.0;
    let yy = TOP + frame.plot_h / 2.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"13\" fill=\"#222\" text-anchor=\"middle\" transform=\"rotate(-90 {} {})\">{}</text>",
        yx, yy, yx, yy, Y_LABEL
    )?;
    Ok(())
}

fn fmt_tick(v: f64) -> String {
    if (v - v.round()).abs() < 0.001 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.1}", v)
    }
}

fn nice_ticks(min: f64, max: f64, ticks: usize) -> (f64, f64, usize) {
    let range = (max - min).abs().max(1e-9);
    let rough = range / (ticks as f64 - 1.0);
    let mag = 10f64.powf(rough.abs().log10().floor());
    let norm = rough / mag;
    let step = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    } * mag;
    let start = (min / step).floor() * step;
    let end = (max / step).ceil() * step;
    let count = ((end - start) / step).round() as usize + 1;
    (start, step, count)
}

fn escape_svg(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
