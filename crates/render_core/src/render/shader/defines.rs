//! Compile-time shader defines
//!
//! A define is one bit of a 64-bit mask. The low bits are reserved for defines the
//! render core itself toggles; materials and render objects allocate theirs from
//! [`ShaderDefines::FIRST_USER_BIT`] upward.

bitflags::bitflags! {
    /// Set of compile-time feature flags selecting a shader variant
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderDefines: u64 {
        /// One shadow cascade
        const SHADOW_PSSM1 = 1 << 0;
        /// Two shadow cascades
        const SHADOW_PSSM2 = 1 << 1;
        /// Three shadow cascades
        const SHADOW_PSSM3 = 1 << 2;
        /// Unfiltered shadow lookup
        const SHADOW_PCF_NO = 1 << 3;
        /// One-tap PCF
        const SHADOW_PCF1 = 1 << 4;
        /// Two-tap PCF
        const SHADOW_PCF2 = 1 << 5;
        /// Three-tap PCF
        const SHADOW_PCF3 = 1 << 6;
        /// Receives shadows from the cascaded shadow map
        const RECEIVE_SHADOW = 1 << 7;

        /// All cascade-count defines
        const SHADOW_PSSM = Self::SHADOW_PSSM1.bits() | Self::SHADOW_PSSM2.bits() | Self::SHADOW_PSSM3.bits();
        /// All PCF-quality defines
        const SHADOW_PCF = Self::SHADOW_PCF_NO.bits()
            | Self::SHADOW_PCF1.bits()
            | Self::SHADOW_PCF2.bits()
            | Self::SHADOW_PCF3.bits();

        // Bits above the built-ins are owned by callers
        const _ = !0;
    }
}

impl Default for ShaderDefines {
    fn default() -> Self {
        Self::empty()
    }
}

impl ShaderDefines {
    /// First bit index available to [`ShaderDefines::user`]
    pub const FIRST_USER_BIT: u32 = 16;

    /// Caller-owned define at `index` bits above [`Self::FIRST_USER_BIT`]
    ///
    /// Returns `None` when the index runs past the 64-bit mask.
    pub const fn user(index: u32) -> Option<Self> {
        match Self::FIRST_USER_BIT.checked_add(index) {
            Some(bit) if bit < u64::BITS => Some(Self::from_bits_retain(1 << bit)),
            _ => None,
        }
    }

    /// Replace every flag of `group` with `selected`
    ///
    /// Used for mutually exclusive families such as the PCF quality defines.
    pub fn set_exclusive(&mut self, group: Self, selected: Self) {
        self.remove(group);
        self.insert(selected & group);
    }
}
