//! Ordered group of tap sensors
//!
//! Members are polled in insertion order and the first one that fires
//! wins, so the order of [`add`](PiezoSensorGroup::add) calls sets tap
//! priority.

use heapless::Vec;

use super::{PiezoId, PiezoSensor};
use crate::arena::{Arena, Entity, Handle};
use crate::config::MAX_PIEZO_SENSORS;
use crate::error::{EntityKind, Error};
use crate::traits::AnalogInput;

/// Handle to a sensor group
pub type GroupId = Handle<PiezoSensorGroup>;

/// A detected tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tap {
    /// Position of the sensor in the group
    pub slot: u8,
    pub sensor: PiezoId,
    /// Raw reading
    pub strength: u16,
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PiezoSensorGroup {
    sensors: Vec<PiezoId, MAX_PIEZO_SENSORS>,
}

impl Entity for PiezoSensorGroup {
    const KIND: EntityKind = EntityKind::PiezoSensorGroup;
}

impl PiezoSensorGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sensor; [`Error::GroupFull`] once every slot is taken
    pub fn add(&mut self, sensor: PiezoId) -> Result<(), Error> {
        self.sensors.push(sensor).map_err(|_| Error::GroupFull)
    }

    /// First member that fires this poll, `None` if all are quiet
    ///
    /// Stops reading at the first tap, so later members are not sampled.
    pub fn tapped<A, const N: usize>(
        &self,
        sensors: &Arena<PiezoSensor, N>,
        io: &mut A,
    ) -> Result<Option<Tap>, Error>
    where
        A: AnalogInput + ?Sized,
    {
        for (slot, &id) in self.sensors.iter().enumerate() {
            let strength = sensors.get(id)?.is_fired(io)?;
            if strength != 0 {
                return Ok(Some(Tap {
                    slot: slot as u8,
                    sensor: id,
                    strength,
                }));
            }
        }
        Ok(None)
    }

    pub fn sensors(&self) -> &[PiezoId] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBoard;

    fn setup() -> (Arena<PiezoSensor, MAX_PIEZO_SENSORS>, PiezoSensorGroup) {
        let mut sensors = Arena::new();
        let mut group = PiezoSensorGroup::new();
        for i in 0..3u8 {
            sensors
                .init(PiezoId::new(i), PiezoSensor::new(10 + i))
                .unwrap();
        }
        // Insertion order differs from id order
        group.add(PiezoId::new(2)).unwrap();
        group.add(PiezoId::new(0)).unwrap();
        group.add(PiezoId::new(1)).unwrap();
        (sensors, group)
    }

    #[test]
    fn test_none_when_quiet() {
        let (sensors, group) = setup();
        let mut board = MockBoard::new();
        for line in 10..13 {
            board.set_analog(line, 49);
        }
        assert_eq!(group.tapped(&sensors, &mut board), Ok(None));
    }

    #[test]
    fn test_first_inserted_wins() {
        let (sensors, group) = setup();
        let mut board = MockBoard::new();
        board.set_analog(10, 300); // sensor 0, slot 1
        board.set_analog(11, 900); // sensor 1, slot 2

        assert_eq!(
            group.tapped(&sensors, &mut board),
            Ok(Some(Tap {
                slot: 1,
                sensor: PiezoId::new(0),
                strength: 300
            }))
        );
    }

    #[test]
    fn test_group_full() {
        let mut group = PiezoSensorGroup::new();
        for i in 0..MAX_PIEZO_SENSORS as u8 {
            group.add(PiezoId::new(i)).unwrap();
        }
        assert_eq!(group.add(PiezoId::new(0)), Err(Error::GroupFull));
        assert_eq!(group.len(), MAX_PIEZO_SENSORS);
    }

    #[test]
    fn test_unconfigured_member() {
        let sensors: Arena<PiezoSensor, 2> = Arena::new();
        let mut group = PiezoSensorGroup::new();
        group.add(PiezoId::new(1)).unwrap();

        let mut board = MockBoard::new();
        assert_eq!(
            group.tapped(&sensors, &mut board),
            Err(Error::InvalidId {
                kind: EntityKind::PiezoSensor,
                index: 1
            })
        );
    }
}
