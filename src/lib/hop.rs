use crate::config::{RadioConfig, SecondaryChannel, HOP_WRAP_CHANNEL};

/// Channel walk used when hopping is enabled.
///
/// Starts from the configured radio channel and steps up by one per hop. On reaching
/// channel 11 the walk wraps to channel 1, and a secondary channel configured below the
/// primary flips above it since channel 1 has nothing below.
#[derive(Debug, Clone)]
pub struct ChannelHopper {
    channel: u8,
    secondary: SecondaryChannel,
    configured_secondary: SecondaryChannel,
}

impl ChannelHopper {
    pub fn new(radio: &RadioConfig) -> Self {
        Self {
            channel: radio.channel,
            secondary: radio.secondary_channel,
            configured_secondary: radio.secondary_channel,
        }
    }

    pub fn current(&self) -> (u8, SecondaryChannel) {
        (self.channel, self.secondary)
    }

    /// Moves to the next channel and returns it.
    pub fn advance(&mut self) -> (u8, SecondaryChannel) {
        self.channel = self.channel.wrapping_add(1);
        if !(1..HOP_WRAP_CHANNEL).contains(&self.channel) {
            self.channel = 1;
            if self.configured_secondary == SecondaryChannel::Below {
                self.secondary = SecondaryChannel::Above;
            }
        }
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_up_from_configured_channel() {
        let mut hopper = ChannelHopper::new(&RadioConfig::default());
        assert_eq!(hopper.current(), (5, SecondaryChannel::Below));
        assert_eq!(hopper.advance(), (6, SecondaryChannel::Below));
        for _ in 0..4 {
            hopper.advance();
        }
        assert_eq!(hopper.current(), (10, SecondaryChannel::Below));
    }

    #[test]
    fn wraps_and_flips_secondary_below() {
        let mut hopper = ChannelHopper::new(&RadioConfig {
            channel: 10,
            ..Default::default()
        });
        assert_eq!(hopper.advance(), (1, SecondaryChannel::Above));
        // Stays above for the rest of the walk
        assert_eq!(hopper.advance(), (2, SecondaryChannel::Above));
        for _ in 0..8 {
            hopper.advance();
        }
        assert_eq!(hopper.advance(), (1, SecondaryChannel::Above));
    }

    #[test]
    fn keeps_other_secondary_settings_on_wrap() {
        let mut hopper = ChannelHopper::new(&RadioConfig {
            channel: 10,
            secondary_channel: SecondaryChannel::None,
            ..Default::default()
        });
        assert_eq!(hopper.advance(), (1, SecondaryChannel::None));
    }

    #[test]
    fn channel_above_wrap_point_wraps_on_first_hop() {
        let mut hopper = ChannelHopper::new(&RadioConfig {
            channel: 13,
            secondary_channel: SecondaryChannel::Above,
            ..Default::default()
        });
        assert_eq!(hopper.advance(), (1, SecondaryChannel::Above));
    }

    #[test]
    fn out_of_range_channel_wraps_without_overflow() {
        let mut hopper = ChannelHopper::new(&RadioConfig {
            channel: u8::MAX,
            secondary_channel: SecondaryChannel::None,
            ..Default::default()
        });
        assert_eq!(hopper.advance(), (1, SecondaryChannel::None));
        assert_eq!(hopper.advance(), (2, SecondaryChannel::None));
    }
}
