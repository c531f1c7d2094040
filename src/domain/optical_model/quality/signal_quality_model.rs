use std::f64::consts::PI;

use crate::domain::optical_model::network::link_detail::SectionElement;
use crate::domain::optical_model::quality::config::QualityConfig;
use crate::domain::optical_model::signal::och_param::{ModulationFormat, OchParam};

/// Neighbouring channels considered on each side for nonlinear interference.
const NUM_CH: i32 = 10;

/// Spacing of the neighbouring channels [Hz].
const CH_SPACING_HZ: f64 = 50.0e9;

#[derive(Debug, Clone, Copy)]
struct AmpParam {
    /// dB
    gain: f64,
    /// dB
    noise_figure: f64,
}

#[derive(Debug, Clone, Copy)]
struct SpanParam {
    /// dBm
    pout: f64,
    /// dB/km
    loss: f64,
    /// km
    length: f64,
    /// m^2
    aeff: f64,
    /// m^2/W
    n2: f64,
    /// ps/nm/m
    cd: f64,
}

impl SpanParam {
    fn pre_amp(pout: f64) -> Self {
        Self { pout, loss: 0.0, length: 0.0, aeff: 1.0, n2: 1.0, cd: 1.0 }
    }

    fn pout_watt(&self) -> f64 {
        to_linear(self.pout) / 1000.0
    }

    fn alpha(&self) -> f64 {
        (self.loss / 20.0) * 10f64.ln()
    }

    fn effective_length(&self) -> f64 {
        (1.0 - (-2.0 * self.alpha() * self.length).exp()) / (2.0 * self.alpha())
    }
}

#[derive(Debug, Clone, Copy)]
struct SignalParam {
    /// m
    lambda: f64,
    /// Hz
    frequency: f64,
    symbol_rate: f64,
}

/// GN-model style estimate of the end-to-end OSNR of a path.
///
/// Stateless apart from the configuration it reads coefficients from.
pub struct SignalQualityModel<'a> {
    config: &'a QualityConfig,
}

impl<'a> SignalQualityModel<'a> {
    pub fn new(config: &'a QualityConfig) -> Self {
        Self { config }
    }

    /// Total OSNR [dB] of the concatenated section elements of a path for one
    /// rate and modulation format.
    ///
    /// `None` means no quality data: a coefficient table is empty or the
    /// elements do not describe an amplified, lossy line.
    pub fn total_osnr(&self, elements: &[SectionElement], param: &OchParam) -> Option<f64> {
        let signal = self.signal_param(param);

        let mut spans_for_osnr: Vec<SpanParam> = Vec::new();
        let mut spans: Vec<SpanParam> = Vec::new();
        let mut amps: Vec<AmpParam> = Vec::new();

        for element in elements {
            match element {
                SectionElement::Amp { amp_type, gain } => {
                    let noise_figure = self.config.noise_figures.lookup_or_first(amp_type.as_str(), "noiseFigures")?;
                    amps.push(AmpParam { gain: *gain, noise_figure });
                }
                SectionElement::PreAmpFiber => spans_for_osnr.push(SpanParam::pre_amp(self.config.pre_amp_pout)),
                SectionElement::Span { fiber_type, span_loss, srlg_length } => {
                    let fiber = fiber_type.as_str();
                    let span = SpanParam {
                        pout: self.config.pout.lookup_or_first(fiber, "Pout")?,
                        loss: span_loss / (srlg_length * 1.0e-3),
                        length: srlg_length * 1.0e-3,
                        aeff: self.config.aeff.lookup_or_first(fiber, "Aeff")? * 1.0e-12,
                        n2: self.config.n2.lookup_or_first(fiber, "N2")?,
                        cd: self.config.cd.lookup_or_first(fiber, "CD")? * 1.0e-3,
                    };
                    spans_for_osnr.push(span);
                    spans.push(span);
                }
            }
        }

        log::trace!("signal={:?} spans={:?} amps={:?}", signal, spans, amps);

        let osnr = self.osnr_ase(&spans_for_osnr, &amps, &signal);
        let total_ase: f64 = amps.iter().map(|a| self.p_ase(&signal, a)).sum();
        let p_nli = self.p_nli(&spans, &signal);
        log::trace!("osnr={} total_P_ASE={} P_NLI={}", osnr, total_ase, p_nli);

        let total = to_db((osnr * total_ase) / (total_ase + p_nli));
        if total.is_finite() { Some(total) } else { None }
    }

    fn signal_param(&self, param: &OchParam) -> SignalParam {
        let frequency = self.config.user_frequency_hz();
        let rate = self.config.rate_value(param.rate);
        let format: ModulationFormat = param.modulation_format;
        let dp = self.config.power_spectral(format);
        SignalParam {
            lambda: self.config.speed_of_light / frequency,
            frequency,
            symbol_rate: rate / (dp * self.config.bit_symbol(format)) * 0.001,
        }
    }

    /// ASE noise power of one amplifier.
    fn p_ase(&self, signal: &SignalParam, amp: &AmpParam) -> f64 {
        (to_linear(amp.gain) - 1.0)
            * to_linear(amp.noise_figure)
            * self.config.planck_constant
            * self.config.delta_f_hz()
            * signal.frequency
    }

    /// Linear OSNR from ASE only. Amplifier `k` feeds span `k`; amplifiers
    /// without a following span see the pre-amp output power.
    fn osnr_ase(&self, spans_for_osnr: &[SpanParam], amps: &[AmpParam], signal: &SignalParam) -> f64 {
        let fallback = SpanParam::pre_amp(self.config.pre_amp_pout);
        let noise_signal_ratio: f64 = amps
            .iter()
            .enumerate()
            .map(|(k, amp)| {
                let pout = spans_for_osnr.get(k).unwrap_or(&fallback).pout_watt();
                self.p_ase(signal, amp) / pout
            })
            .sum();
        1.0 / noise_signal_ratio
    }

    /// Nonlinear interference noise power accumulated over all fiber spans.
    fn p_nli(&self, spans: &[SpanParam], signal: &SignalParam) -> f64 {
        let mut sum_gs = 0.0;
        let mut sum_leff = 0.0;
        for s in 0..spans.len() {
            sum_gs += self.spectral_density(spans, signal, s);
            sum_leff += spans[s].effective_length();
        }
        sum_gs *= 16.0 / 27.0;
        sum_gs *= 0.0121 * sum_leff - 0.0744;
        self.config.delta_f_hz() * sum_gs / 1.0e12
    }

    fn spectral_density(&self, spans: &[SpanParam], signal: &SignalParam, s: usize) -> f64 {
        let span = &spans[s];

        // (gamma * Leff)^2
        let s1 = (self.gamma(span, signal.lambda) * span.effective_length()).powi(2);

        // Spans before s: (Gamma^3 * e^(-6 alpha L))
        let s2: f64 = spans[..s]
            .iter()
            .map(|sp| to_linear(sp.loss * sp.length).powi(3) * (-6.0 * sp.alpha() * sp.length).exp())
            .product();

        // Span s and after: (Gamma * e^(-2 alpha L))
        let s3: f64 =
            spans[s..].iter().map(|sp| to_linear(sp.loss * sp.length) * (-2.0 * sp.alpha() * sp.length).exp()).product();

        let g = span.pout_watt() / signal.symbol_rate;
        let s4 = g.powi(3) * self.psi(span, signal);

        log::trace!("s1={} s2={} s3={} s4={}", s1, s2, s3, s4);
        s1 * s2 * s3 * s4
    }

    fn psi(&self, span: &SpanParam, signal: &SignalParam) -> f64 {
        let pi2 = PI * PI;
        let alpha_beta = self.beta(span, signal.lambda).abs() / (2.0 * span.alpha());
        let b = signal.symbol_rate;

        (-NUM_CH..=NUM_CH)
            .map(|i| {
                if i == 0 {
                    2.0 * (pi2 / 2.0 * alpha_beta * b * b).asinh() / (2.0 * PI * alpha_beta)
                } else {
                    let offset = CH_SPACING_HZ * i as f64;
                    let b1 = (offset + b / 2.0) * b;
                    let b2 = (offset - b / 2.0) * b;
                    ((pi2 * alpha_beta * b1).asinh() - (pi2 * alpha_beta * b2).asinh()) / (4.0 * PI * alpha_beta)
                }
            })
            .sum()
    }

    /// Group velocity dispersion.
    fn beta(&self, span: &SpanParam, lambda: f64) -> f64 {
        -(lambda.powi(2) / (2.0 * PI * self.config.speed_of_light)) * span.cd * 1.0e24
    }

    /// Nonlinear coefficient.
    fn gamma(&self, span: &SpanParam, lambda: f64) -> f64 {
        (2.0 * PI * span.n2) / (lambda * span.aeff) * 1000.0
    }
}

fn to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

fn to_db(linear: f64) -> f64 {
    10.0 * linear.log10()
}
