use accel_lib::{
    peaks::MAX_PASSES,
    plot::{
        figure_filtered, figure_histogram, figure_peaks, figure_scatter, figure_spectrum,
        figure_time, DisplaySink,
    },
    session::AnalysisSession,
    AnalysisResult,
};
use anyhow::Result;
use serde::Serialize;
use std::io::{BufRead, Write};

pub const MENU: &str = "Select an option:
0) - show menu
1) - show time based figure of the input data set
2) - show the sampling frequency & time
3) - find peak values
4) - show the input signal in frequency domain
5) - show histogram of data set
6) - show scatter diagram of data set
7) - show statistical information of the data set
8) - show the filtered data set
x) - exit from this program";

/// Interactive loop over one analysis session.
pub struct Menu<'a, R, W, S> {
    session: &'a AnalysisSession,
    input: R,
    out: W,
    sink: S,
    json: bool,
}

enum Flow {
    Continue,
    Quit,
}

impl<'a, R: BufRead, W: Write, S: DisplaySink> Menu<'a, R, W, S> {
    pub fn new(session: &'a AnalysisSession, input: R, out: W, sink: S, json: bool) -> Self {
        Self {
            session,
            input,
            out,
            sink,
            json,
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run until `x` or end of input.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "{MENU}")?;
        while let Some(line) = self.read_line()? {
            match self.dispatch(line.trim())? {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn dispatch(&mut self, option: &str) -> Result<Flow> {
        match option {
            "0" => writeln!(self.out, "{MENU}")?,
            "1" => self.time_view()?,
            "2" => self.sampling_report()?,
            "3" => return self.peak_search(),
            "4" => self.spectrum_view()?,
            "5" => self.histogram_view()?,
            "6" => self.scatter_view()?,
            "7" => self.statistics()?,
            "8" => self.filtered_view()?,
            "x" => return Ok(Flow::Quit),
            _ => writeln!(self.out, "Invalid input parameter. Try again!")?,
        }
        Ok(Flow::Continue)
    }

    /// Print analysis failures and keep the menu alive.
    fn report<T>(&mut self, result: AnalysisResult<T>) -> Result<Option<T>> {
        match result {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                writeln!(self.out, "Error: {e}")?;
                Ok(None)
            }
        }
    }

    fn show(&mut self, name: &str, fig: accel_lib::plot::Figure) -> Result<()> {
        match self.sink.show(name, &fig) {
            Ok(Some(path)) => writeln!(self.out, "Figure saved to {}", path.display())?,
            Ok(None) => {}
            Err(e) => writeln!(self.out, "Error: could not display {name}: {e:#}")?,
        }
        Ok(())
    }

    fn print_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string(value)?)?;
        Ok(())
    }

    fn max_points(&self) -> usize {
        self.session.config().max_plot_points
    }

    fn time_view(&mut self) -> Result<()> {
        if let Some(time) = self.report(self.session.time_axis())? {
            let fig = figure_time(
                "Data set in time domain",
                &time,
                self.session.values(),
                self.max_points(),
            );
            self.show("time", fig)?;
        }
        Ok(())
    }

    fn sampling_report(&mut self) -> Result<()> {
        if let Some(report) = self.report(self.session.sampling_report())? {
            if self.json {
                self.print_json(&report)?;
            } else {
                writeln!(
                    self.out,
                    "Sampling frequency: {} Hz\nSampling time period: {} s",
                    report.frequency_hz, report.period_s
                )?;
            }
        }
        Ok(())
    }

    fn ask_passes(&mut self) -> Result<Option<usize>> {
        writeln!(
            self.out,
            "This program uses a simple peak finding algorithm. The more times the algorithm runs, the wider ranges it covers.\nHow many times should the algorithm run (1-{MAX_PASSES})?"
        )?;
        while let Some(line) = self.read_line()? {
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=MAX_PASSES).contains(&n) => return Ok(Some(n)),
                Ok(_) => writeln!(
                    self.out,
                    "Your answer is not in range (1-{MAX_PASSES}). Try again!"
                )?,
                Err(_) => writeln!(self.out, "Your answer is invalid. Try again!")?,
            }
        }
        Ok(None)
    }

    fn peak_search(&mut self) -> Result<Flow> {
        let Some(passes) = self.ask_passes()? else {
            return Ok(Flow::Quit);
        };
        let Some(peaks) = self.report(self.session.peaks(passes))? else {
            return Ok(Flow::Continue);
        };
        if self.json {
            self.print_json(&peaks)?;
        } else {
            writeln!(self.out, "Found {} peak(s) after {passes} pass(es)", peaks.len())?;
        }
        let Some(times) = self.report(self.session.peak_times(&peaks))? else {
            return Ok(Flow::Continue);
        };
        if let Some(time) = self.report(self.session.time_axis())? {
            let fig = figure_peaks(&time, self.session.values(), &peaks, &times, self.max_points());
            self.show("peaks", fig)?;
        }
        Ok(Flow::Continue)
    }

    fn spectrum_view(&mut self) -> Result<()> {
        if let Some(spectrum) = self.report(self.session.spectrum())? {
            writeln!(
                self.out,
                "Frequency resolution: {} Hz over {} bins",
                spectrum.resolution_hz(),
                spectrum.len()
            )?;
            let fig = figure_spectrum(&spectrum, self.max_points());
            self.show("spectrum", fig)?;
        }
        Ok(())
    }

    fn histogram_view(&mut self) -> Result<()> {
        let Some(period) = self.report(self.session.period())? else {
            return Ok(());
        };
        if let Some(hist) = self.report(self.session.histogram())? {
            self.show("histogram", figure_histogram(&hist, period))?;
        }
        Ok(())
    }

    fn scatter_view(&mut self) -> Result<()> {
        let fig = figure_scatter(self.session.values(), self.max_points());
        self.show("scatter", fig)
    }

    fn statistics(&mut self) -> Result<()> {
        if let Some(summary) = self.report(self.session.statistics())? {
            if self.json {
                self.print_json(&summary)?;
            } else {
                writeln!(self.out, "{}", summary.to_text())?;
            }
        }
        Ok(())
    }

    fn filtered_view(&mut self) -> Result<()> {
        let Some((coeffs, filtered)) = self.report(self.session.filtered())? else {
            return Ok(());
        };
        let kind = self.session.config().filter.as_str().to_uppercase();
        if self.json {
            self.print_json(&coeffs)?;
        } else {
            writeln!(
                self.out,
                "Designed {kind} filter of order {} ({} b / {} a taps)",
                coeffs.order(),
                coeffs.b.len(),
                coeffs.a.len()
            )?;
        }
        if let Some(time) = self.report(self.session.time_axis())? {
            let fig = figure_filtered(&time, self.session.values(), &filtered, self.max_points());
            self.show("filtered", fig)?;
        }
        Ok(())
    }
}
