//! Protocol constants. All monetary values in satoshis (1 BTC = 10^8 sats).

pub const COIN: u64 = 100_000_000;

/// Default fee rate in sats per weight unit.
pub const DEFAULT_FEE_RATE: u32 = 10;
/// Default input weight in weight units (P2WPKH spend).
pub const DEFAULT_INPUT_SIZE: u32 = 69;
/// Default output weight in weight units (P2WPKH output).
pub const DEFAULT_OUTPUT_SIZE: u32 = 33;

/// Maximum number of denominations in one decomposition.
///
/// Also the number of index bytes that fit the packed `u64` encoding,
/// so this can never exceed 8.
pub const MAX_DECOMPOSITION_LEN: usize = 8;

/// Initial shortfall tolerance of the decomposition search, in sats.
pub const BASE_TOLERANCE: i64 = 10;
/// Tolerance increment applied on each empty-result retry.
pub const TOLERANCE_STEP: i64 = 20;
/// Candidate cap for the first search pass.
pub const FIRST_PASS_CAP: usize = 40;
/// Candidate cap for relaxed-tolerance retries.
pub const RETRY_CAP: usize = 50;
/// Candidate cap of the inner combination search.
pub const SEARCH_CAP: usize = 60;

/// Maximum tolerated gap between a chosen decomposition's sum and its
/// target. A selected decomposition further away than this is a defect.
pub const MAX_SELECTED_DIFF: i64 = 100;

/// Standard output denominations in sats, descending.
///
/// Mixed powers of two, powers of three, and decimal round amounts,
/// floored at 1000 sats (everything below 486 + 330 is unusable once the
/// per-output fee is added). Indices into this table must fit in one byte,
/// which caps the table at 256 entries permanently.
pub const STD_DENOMS: [i64; 101] = [
    2_541_865_828_329,
    2_199_023_255_552,
    2_000_000_000_000,
    1_694_577_218_886,
    1_099_511_627_776,
    1_000_000_000_000,
    847_288_609_443,
    564_859_072_962,
    549_755_813_888,
    500_000_000_000,
    282_429_536_481,
    274_877_906_944,
    200_000_000_000,
    188_286_357_654,
    137_438_953_472,
    100_000_000_000,
    94_143_178_827,
    68_719_476_736,
    62_762_119_218,
    50_000_000_000,
    34_359_738_368,
    31_381_059_609,
    20_920_706_406,
    20_000_000_000,
    17_179_869_184,
    10_460_353_203,
    10_000_000_000,
    8_589_934_592,
    6_973_568_802,
    5_000_000_000,
    4_294_967_296,
    3_486_784_401,
    2_324_522_934,
    2_147_483_648,
    2_000_000_000,
    1_162_261_467,
    1_073_741_824,
    1_000_000_000,
    774_840_978,
    536_870_912,
    500_000_000,
    387_420_489,
    268_435_456,
    258_280_326,
    200_000_000,
    134_217_728,
    129_140_163,
    100_000_000,
    86_093_442,
    67_108_864,
    50_000_000,
    43_046_721,
    33_554_432,
    28_697_814,
    20_000_000,
    16_777_216,
    14_348_907,
    10_000_000,
    9_565_938,
    8_388_608,
    5_000_000,
    4_782_969,
    4_194_304,
    3_188_646,
    2_097_152,
    2_000_000,
    1_594_323,
    1_062_882,
    1_048_576,
    1_000_000,
    531_441,
    524_288,
    500_000,
    354_294,
    262_144,
    200_000,
    177_147,
    131_072,
    118_098,
    100_000,
    65_536,
    59_049,
    50_000,
    39_366,
    32_768,
    20_000,
    19_683,
    16_384,
    13_122,
    10_000,
    8_192,
    6_561,
    5_000,
    4_374,
    4_096,
    2_187,
    2_048,
    2_000,
    1_458,
    1_024,
    1_000,
];
