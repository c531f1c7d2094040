use std::collections::HashMap;
use std::sync::RwLock;

use crate::api::network_dto::{LinkDetailDto, NetworkDto, SectionElementDto};
use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::utils::id::{AmpType, FiberType};

/// One physical element of an OMS section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionElement {
    Amp {
        amp_type: AmpType,
        /// dB
        gain: f64,
    },
    Span {
        fiber_type: FiberType,
        /// dB
        span_loss: f64,
        /// meters
        srlg_length: f64,
    },

    /// Pseudo span behind a trailing amplifier whose output power is the pre-amp output.
    PreAmpFiber,
}

impl SectionElement {
    pub fn from_dto(dto: &SectionElementDto) -> Self {
        match dto {
            SectionElementDto::Amp { amp_type, gain } => SectionElement::Amp { amp_type: AmpType::new(amp_type.as_str()), gain: *gain },
            SectionElementDto::Span { fiber_type, span_loss, srlg_length } => SectionElement::Span {
                fiber_type: FiberType::new(fiber_type.as_str()),
                span_loss: *span_loss,
                srlg_length: *srlg_length,
            },
            SectionElementDto::PreAmpFiber => SectionElement::PreAmpFiber,
        }
    }

    pub fn to_dto(&self) -> SectionElementDto {
        match self {
            SectionElement::Amp { amp_type, gain } => SectionElementDto::Amp { amp_type: amp_type.to_string(), gain: *gain },
            SectionElement::Span { fiber_type, span_loss, srlg_length } => SectionElementDto::Span {
                fiber_type: fiber_type.to_string(),
                span_loss: *span_loss,
                srlg_length: *srlg_length,
            },
            SectionElement::PreAmpFiber => SectionElementDto::PreAmpFiber,
        }
    }
}

/// Sum of the span lengths in km.
pub fn total_span_km(elements: &[SectionElement]) -> f64 {
    elements
        .iter()
        .map(|e| match e {
            SectionElement::Span { srlg_length, .. } => srlg_length / 1000.0,
            _ => 0.0,
        })
        .sum()
}

/// Supplies the ordered physical elements of a link.
pub trait LinkDetailProvider: Send + Sync {
    /// Section elements of `src -> dst`. Empty when the link has no known detail.
    fn section_elements(&self, src: &ConnectPoint, dst: &ConnectPoint) -> Vec<SectionElement>;

    fn total_span_km(&self, link: &Link) -> f64 {
        total_span_km(&self.section_elements(&link.src, &link.dst))
    }

    /// All known details in the network document format.
    fn export(&self) -> Vec<LinkDetailDto>;
}

/// Link details held in memory, typically loaded from the network document.
#[derive(Debug, Default)]
pub struct StaticLinkDetailProvider {
    details: RwLock<HashMap<(ConnectPoint, ConnectPoint), Vec<SectionElement>>>,
}

impl StaticLinkDetailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dto(dto: &NetworkDto) -> Self {
        let provider = StaticLinkDetailProvider::new();
        for detail in &dto.link_details {
            provider.load(detail);
        }
        provider
    }

    fn load(&self, detail: &LinkDetailDto) {
        let elements: Vec<SectionElement> =
            detail.elements.iter().filter(|e| **e != SectionElementDto::PreAmpFiber).map(SectionElement::from_dto).collect();

        if detail.bidirectional {
            let reversed: Vec<SectionElement> = elements.iter().rev().cloned().collect();
            self.set(detail.dst.clone(), detail.src.clone(), reversed);
        }
        self.set(detail.src.clone(), detail.dst.clone(), elements);
    }

    /// Replaces the elements of `src -> dst`. A chain ending with an amplifier
    /// is closed with a [`SectionElement::PreAmpFiber`].
    pub fn set(&self, src: ConnectPoint, dst: ConnectPoint, mut elements: Vec<SectionElement>) {
        elements.retain(|e| *e != SectionElement::PreAmpFiber);
        if matches!(elements.last(), Some(SectionElement::Amp { .. })) {
            elements.push(SectionElement::PreAmpFiber);
        }
        let mut guard = self.details.write().expect("RwLock poisoned");
        guard.insert((src, dst), elements);
    }
}

impl LinkDetailProvider for StaticLinkDetailProvider {
    fn section_elements(&self, src: &ConnectPoint, dst: &ConnectPoint) -> Vec<SectionElement> {
        let guard = self.details.read().expect("RwLock poisoned");
        match guard.get(&(src.clone(), dst.clone())) {
            Some(elements) => elements.clone(),
            None => {
                log::warn!("No link detail found for {} -> {}", src, dst);
                Vec::new()
            }
        }
    }

    /// Sorted by link.
    fn export(&self) -> Vec<LinkDetailDto> {
        let guard = self.details.read().expect("RwLock poisoned");
        let mut details: Vec<LinkDetailDto> = guard
            .iter()
            .map(|((src, dst), elements)| LinkDetailDto {
                src: src.clone(),
                dst: dst.clone(),
                elements: elements.iter().map(SectionElement::to_dto).collect(),
                bidirectional: false,
            })
            .collect();
        details.sort_by(|a, b| (&a.src, &a.dst).cmp(&(&b.src, &b.dst)));
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amp(gain: f64) -> SectionElement {
        SectionElement::Amp { amp_type: AmpType::new("HighGainAmp"), gain }
    }

    fn span(len_m: f64) -> SectionElement {
        SectionElement::Span { fiber_type: FiberType::new("smf"), span_loss: 20.0, srlg_length: len_m }
    }

    #[test]
    fn test_trailing_amp_gets_pre_amp_fiber() {
        let provider = StaticLinkDetailProvider::new();
        let (a, b) = (ConnectPoint::new("A", 1), ConnectPoint::new("B", 1));
        provider.set(a.clone(), b.clone(), vec![amp(20.0), span(80_000.0), amp(20.0)]);

        let elements = provider.section_elements(&a, &b);
        assert_eq!(elements.len(), 4);
        assert_eq!(elements.last(), Some(&SectionElement::PreAmpFiber));
        assert_eq!(total_span_km(&elements), 80.0);
    }

    #[test]
    fn test_bidirectional_detail_is_reversed() {
        let dto: NetworkDto = serde_json::from_str(
            r#"{"devices": [], "linkDetails": [{"src": "A/1", "dst": "B/1", "bidirectional": true, "elements": [
                {"type": "span", "fiberType": "smf", "spanLoss": 10.0, "srlgLength": 40000.0},
                {"type": "amp", "ampType": "LowGainAmp", "gain": 10.0}
            ]}]}"#,
        )
        .unwrap();
        let provider = StaticLinkDetailProvider::from_dto(&dto);

        let forward = provider.section_elements(&ConnectPoint::new("A", 1), &ConnectPoint::new("B", 1));
        let backward = provider.section_elements(&ConnectPoint::new("B", 1), &ConnectPoint::new("A", 1));
        assert_eq!(forward.last(), Some(&SectionElement::PreAmpFiber));
        assert!(matches!(backward.first(), Some(SectionElement::Amp { .. })));
        assert!(matches!(backward.last(), Some(SectionElement::Span { .. })));
    }

    #[test]
    fn test_unknown_link_has_no_span() {
        let provider = StaticLinkDetailProvider::new();
        let link = Link::new(ConnectPoint::new("A", 1), ConnectPoint::new("B", 1));
        assert_eq!(provider.total_span_km(&link), 0.0);
    }
}
