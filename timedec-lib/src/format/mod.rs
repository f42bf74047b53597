//! The format registry: one entry per supported timestamp encoding.
//!
//! [`Format`] is the tagged codec type; [`ALL`] is the ordered registry the
//! guess and batch drivers iterate. Each entry carries the static metadata
//! shown to users: the CLI identifier, display name, the reason string
//! printed when a raw value fails shape validation, and the zone annotation
//! appended to decoded output.

pub(crate) mod apple;
pub(crate) mod gps;
pub(crate) mod julian;
pub(crate) mod mobile;
pub(crate) mod unix;
pub(crate) mod web;
pub(crate) mod windows;

use crate::datetime::DateTime;
use crate::Result;

/// One supported timestamp representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    ActiveDirectory,
    Apache,
    Biome64,
    BiomeHex,
    BitDate,
    BitDec,
    Dhcp6,
    Discord,
    Exfat,
    Fat,
    GmailBoundary,
    GmailMsgId,
    Chrome,
    Eitime,
    Gps,
    Gsm,
    HfsBe,
    HfsLe,
    JulianDec,
    JulianHex,
    NsDate,
    KsuidAlnum,
    KsuidDec,
    Leb128Hex,
    HfsDec,
    Mastodon,
    Metasploit,
    SystemTime,
    FileTime,
    Hotmail,
    Dotnet,
    Moto,
    PrTime,
    Msdos,
    Ms1904,
    Ns40,
    Ns40Le,
    Nokia,
    NokiaLe,
    OleAuto,
    S32,
    SemiOctet,
    Sony,
    Symantec,
    TikTok,
    Twitter,
    UnixHexBe,
    UnixHexLe,
    UnixSec,
    UnixMilli,
    UnixMilliHex,
    Uuid,
    Vmsd,
    WindowsHexBe,
    WindowsHexLe,
    Cookie,
    OleBe,
    OleLe,
    Mac,
    Bplist,
    IosTime,
}

/// Static metadata for one registry entry.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub format: Format,
    /// CLI flag identifier.
    pub id: &'static str,
    /// Human-readable format name.
    pub name: &'static str,
    /// Printed when a raw value fails this format's shape validation.
    pub reason: &'static str,
    /// Zone annotation appended to decoded output.
    pub zone: &'static str,
    /// Whether the guess scan runs this format. The NSDate family members
    /// are covered by the `nsdate` dispatcher and excluded individually.
    pub in_guess: bool,
}

pub(crate) mod reason {
    pub const UNIX_SEC: &str = "Unix seconds timestamp is 10 digits in length";
    pub const UNIX_MILLI: &str = "Unix milliseconds timestamp is 13 digits in length";
    pub const UNIX_MILLI_HEX: &str =
        "Unix Milliseconds hex timestamp is 12 hex characters (6 bytes)";
    pub const WINDOWS_HEX_BE: &str =
        "Windows 64-bit Hex Big-Endian timestamp is 16 hex characters (8 bytes)";
    pub const WINDOWS_HEX_LE: &str =
        "Windows 64-bit Hex Little-Endian timestamp is 16 hex characters (8 bytes)";
    pub const CHROME: &str = "Chrome/Webkit timestamp is 17 digits";
    pub const AD: &str = "Active Directory/LDAP timestamps are 18 digits";
    pub const UNIX_HEX_BE: &str =
        "Unix Hex 32-bit Big-Endian timestamps are 8 hex characters (4 bytes)";
    pub const UNIX_HEX_LE: &str =
        "Unix Hex 32-bit Little-Endian timestamps are 8 hex characters (4 bytes)";
    pub const COOKIE: &str =
        "IE text cookie times consist of 2 ints, enter with a comma between them";
    pub const OLE_BE: &str = "OLE Big-Endian timestamps are 16 hex characters (8 bytes)";
    pub const OLE_LE: &str = "OLE Little-Endian timestamps are 16 hex characters (8 bytes)";
    pub const MAC: &str = "NSDates (Mac) are 9 digits '.' 6 digits";
    pub const HFS_DEC: &str = "Mac OS/HFS+ Decimal timestamps are 10 digits";
    pub const HFS_BE: &str = "HFS/HFS+ Big-Endian timestamps are 8 hex characters (4 bytes)";
    pub const HFS_LE: &str = "HFS/HFS+ Little-Endian timestamps are 8 hex characters (4 bytes)";
    pub const MSDOS: &str = "MS-DOS 32-bit timestamps are 8 hex characters (4 bytes)";
    pub const FAT: &str = "MS-DOS wFatDate wFatTime timestamps are 8 hex characters (4 bytes)";
    pub const SYSTEMTIME: &str =
        "Microsoft 128-bit SYSTEMTIME timestamps are 32 hex characters (16 bytes)";
    pub const FILETIME: &str =
        "FILETIME timestamps are 2 sets of 8 hex chars (4 bytes) separated by a colon";
    pub const HOTMAIL: &str =
        "Hotmail timestamps are 2 sets of 8 hex chars (4 bytes), separated by a colon";
    pub const PRTIME: &str = "Mozilla PRTime timestamps are 16 digits";
    pub const OLE_AUTO: &str = "OLE Automation timestamps are 2 ints, separated by a dot";
    pub const MS1904: &str = "Excel 1904 timestamps are 2 ints, separated by a dot";
    pub const IOSTIME: &str = "NSDates (iOS) are 15-18 digits in length";
    pub const SYMANTEC: &str = "Symantec 6-byte hex timestamps are 12 hex characters";
    pub const GPS: &str = "GPS timestamps are 10 digits";
    pub const EITIME: &str =
        "Google ei timestamps contain only URLsafe base64 characters: A-Za-z0-9=-_";
    pub const BPLIST: &str = "NSDates (bplist) are 9 digits in length";
    pub const NSDATE: &str = "NSDates are 9, 9.6, or 15-18 digits in length";
    pub const GSM: &str = "GSM timestamps are 14 hex characters (7 bytes)";
    pub const JULIAN_DEC: &str =
        "Julian Date decimal values are 7 digits, a decimal, and up to 10 digits";
    pub const JULIAN_HEX: &str = "Julian Date hex values are 14 characters (7 bytes)";
    pub const VMSD: &str =
        "VMSD values are a 6-digit value and a signed/unsigned int at least 9 digits";
    pub const TIKTOK: &str = "TikTok timestamps are 19 digits long";
    pub const TWITTER: &str = "Twitter timestamps are 18 digits or longer";
    pub const DISCORD: &str = "Discord timestamps are 18 digits or longer";
    pub const KSUID_ALNUM: &str = "KSUID values are 27 alpha-numeric characters";
    pub const MASTODON: &str = "Mastodon timestamps are 18 digits or longer";
    pub const METASPLOIT: &str =
        "Metasploit Payload UUID's are at least 22 chars and base64 urlsafe encoded";
    pub const SONY: &str = "Sonyflake values are 15 hex characters";
    pub const UUID: &str = "UUIDs are in the format 00000000-0000-0000-0000-000000000000";
    pub const DHCP6: &str = "DHCPv6 DUID values are at least 14 bytes long";
    pub const DOTNET: &str = ".NET DateTime values are 18 digits";
    pub const GBOUND: &str = "GMail Boundary values are 28 hex chars";
    pub const GMSGID: &str = "GMail Message ID values are 16 hex chars or 19 digits (IMAP)";
    pub const MOTO: &str = "Motorola 6-byte hex timestamps are 12 hex characters";
    pub const NOKIA: &str = "Nokia 4-byte hex timestamps are 8 hex characters";
    pub const NS40: &str = "Nokia 7-byte hex timestamps are 14 hex characters";
    pub const BITDEC: &str = "Bitwise Decimal timestamps are 10 digits";
    pub const BITDATE: &str = "Samsung/LG BitDate timestamps are 8 hex characters";
    pub const KSUID_DEC: &str = "KSUID decimal timestamps are 9 digits in length";
    pub const EXFAT: &str = "exFAT 32-bit timestamps are 8 hex characters (4 bytes)";
    pub const BIOME_HEX: &str = "Apple Biome Hex value is 8 bytes (16 chars) long";
    pub const BIOME64: &str = "Apple Biome 64-bit decimal is 19 digits in length";
    pub const S32: &str = "S32 encoded (Bluesky) timestamps are 9 characters long";
    pub const APACHE: &str = "Apache Cookie hex timestamps are 13 hex characters long";
    pub const LEB128: &str = "LEB128 Hex timestamps are variable-length and even-length";
    pub const SEMI_OCTET: &str = "Semi-Octet decimal values are 12 or 14 digits long";
}

macro_rules! descriptor {
    ($fmt:ident, $id:literal, $name:literal, $reason:ident, $zone:literal, $guess:literal) => {
        Descriptor {
            format: Format::$fmt,
            id: $id,
            name: $name,
            reason: reason::$reason,
            zone: $zone,
            in_guess: $guess,
        }
    };
}

/// The registry, in guess-scan order. The three NSDate family members at
/// the end are reachable by their own identifiers but are covered in the
/// scan by the `nsdate` dispatcher.
pub const ALL: &[Descriptor] = &[
    descriptor!(ActiveDirectory, "active", "Active Directory/LDAP", AD, "UTC", true),
    descriptor!(Apache, "apache", "Apache Cookie Hex time", APACHE, "UTC", true),
    descriptor!(Biome64, "biome64", "Apple Biome 64-bit decimal", BIOME64, "UTC", true),
    descriptor!(BiomeHex, "biomehex", "Apple Biome hex time", BIOME_HEX, "UTC", true),
    descriptor!(BitDate, "bitdate", "BitDate time", BITDATE, "Local", true),
    descriptor!(BitDec, "bitdec", "Bitwise Decimal time", BITDEC, "Local", true),
    descriptor!(Dhcp6, "dhcp6", "DHCP6 DUID time", DHCP6, "UTC", true),
    descriptor!(Discord, "discord", "Discord time", DISCORD, "UTC", true),
    descriptor!(Exfat, "exfat", "exFAT time", EXFAT, "Local", true),
    descriptor!(Fat, "fat", "FAT Date + Time", FAT, "Local", true),
    descriptor!(GmailBoundary, "gbound", "GMail Boundary time", GBOUND, "UTC", true),
    descriptor!(GmailMsgId, "gmsgid", "GMail Message ID time", GMSGID, "UTC", true),
    descriptor!(Chrome, "chrome", "Google Chrome", CHROME, "UTC", true),
    descriptor!(Eitime, "eitime", "Google EI time", EITIME, "UTC", true),
    descriptor!(Gps, "gps", "GPS time", GPS, "UTC", true),
    descriptor!(Gsm, "gsm", "GSM time", GSM, "UTC", true),
    descriptor!(HfsBe, "hfsbe", "HFS/HFS+ 32-bit Hex BE", HFS_BE, "HFS Local / HFS+ UTC", true),
    descriptor!(HfsLe, "hfsle", "HFS/HFS+ 32-bit Hex LE", HFS_LE, "HFS Local / HFS+ UTC", true),
    descriptor!(JulianDec, "jdec", "Julian Date decimal value", JULIAN_DEC, "UTC", true),
    descriptor!(JulianHex, "jhex", "Julian Date hex value", JULIAN_HEX, "UTC", true),
    descriptor!(NsDate, "nsdate", "NSDate - bplist / Cocoa / Mac / iOS", NSDATE, "UTC", true),
    descriptor!(KsuidAlnum, "ksalnum", "KSUID Alpha-numeric", KSUID_ALNUM, "UTC", true),
    descriptor!(KsuidDec, "ksdec", "KSUID Decimal", KSUID_DEC, "UTC", true),
    descriptor!(Leb128Hex, "leb128", "LEB128 Hex time", LEB128, "UTC", true),
    descriptor!(HfsDec, "hfsdec", "Mac OS/HFS+ Decimal Time", HFS_DEC, "UTC", true),
    descriptor!(Mastodon, "mastodon", "Mastodon time", MASTODON, "UTC", true),
    descriptor!(Metasploit, "meta", "Metasploit Payload UUID", METASPLOIT, "UTC", true),
    descriptor!(SystemTime, "systime", "Microsoft 128-bit SYSTEMTIME", SYSTEMTIME, "UTC", true),
    descriptor!(FileTime, "ft", "Microsoft FILETIME time", FILETIME, "UTC", true),
    descriptor!(Hotmail, "hotmail", "Microsoft Hotmail time", HOTMAIL, "UTC", true),
    descriptor!(Dotnet, "dotnet", "Microsoft .NET DateTime", DOTNET, "UTC", true),
    descriptor!(Moto, "moto", "Motorola time", MOTO, "UTC", true),
    descriptor!(PrTime, "pr", "Mozilla PRTime", PRTIME, "UTC", true),
    descriptor!(Msdos, "msdos", "MS-DOS 32-bit Hex Value", MSDOS, "Local", true),
    descriptor!(Ms1904, "ms1904", "MS Excel 1904 Date", MS1904, "UTC", true),
    descriptor!(Ns40, "ns40", "Nokia S40 time", NS40, "UTC", true),
    descriptor!(Ns40Le, "ns40le", "Nokia S40 time LE", NS40, "UTC", true),
    descriptor!(Nokia, "nokia", "Nokia time", NOKIA, "UTC", true),
    descriptor!(NokiaLe, "nokiale", "Nokia time LE", NOKIA, "UTC", true),
    descriptor!(OleAuto, "auto", "OLE Automation Date", OLE_AUTO, "UTC", true),
    descriptor!(S32, "s32", "S32 Encoded (Bluesky) time", S32, "UTC", true),
    descriptor!(SemiOctet, "semi", "Semi-Octet decimal value", SEMI_OCTET, "Local", true),
    descriptor!(Sony, "sony", "Sonyflake time", SONY, "UTC", true),
    descriptor!(Symantec, "sym", "Symantec AV time", SYMANTEC, "UTC", true),
    descriptor!(TikTok, "tiktok", "TikTok time", TIKTOK, "UTC", true),
    descriptor!(Twitter, "twitter", "Twitter time", TWITTER, "UTC", true),
    descriptor!(UnixHexBe, "uhbe", "Unix Hex 32-bit BE", UNIX_HEX_BE, "UTC", true),
    descriptor!(UnixHexLe, "uhle", "Unix Hex 32-bit LE", UNIX_HEX_LE, "UTC", true),
    descriptor!(UnixSec, "unix", "Unix Seconds", UNIX_SEC, "UTC", true),
    descriptor!(UnixMilli, "umil", "Unix Milliseconds", UNIX_MILLI, "UTC", true),
    descriptor!(UnixMilliHex, "umilhex", "Unix Milliseconds hex", UNIX_MILLI_HEX, "UTC", true),
    descriptor!(Uuid, "uu", "UUID time", UUID, "UTC", true),
    descriptor!(Vmsd, "vm", "VMSD time", VMSD, "UTC", true),
    descriptor!(WindowsHexBe, "wh", "Windows 64-bit Hex BE", WINDOWS_HEX_BE, "UTC", true),
    descriptor!(WindowsHexLe, "whle", "Windows 64-bit Hex LE", WINDOWS_HEX_LE, "UTC", true),
    descriptor!(Cookie, "cookie", "Windows Cookie Date", COOKIE, "UTC", true),
    descriptor!(OleBe, "oleb", "Windows OLE 64-bit double BE", OLE_BE, "UTC", true),
    descriptor!(OleLe, "olel", "Windows OLE 64-bit double LE", OLE_LE, "UTC", true),
    descriptor!(Mac, "mac", "NSDate - Mac Absolute time", MAC, "UTC", false),
    descriptor!(Bplist, "bplist", "NSDate - Binary Plist / Cocoa", BPLIST, "UTC", false),
    descriptor!(IosTime, "iostime", "NSDate - iOS 11+", IOSTIME, "UTC", false),
];

/// Look up a registry entry by its CLI identifier.
pub fn from_id(id: &str) -> Option<&'static Descriptor> {
    ALL.iter().find(|desc| desc.id == id)
}

impl Format {
    pub fn descriptor(&self) -> &'static Descriptor {
        ALL.iter()
            .find(|desc| desc.format == *self)
            .unwrap_or_else(|| unreachable!("{self:?} has no registry entry"))
    }

    /// Decode a raw timestamp string into a calendar value.
    pub fn decode(&self, raw: &str) -> Result<DateTime> {
        match self {
            Format::ActiveDirectory => windows::decode_ad(raw),
            Format::Apache => unix::decode_apache(raw),
            Format::Biome64 => apple::decode_biome64(raw),
            Format::BiomeHex => apple::decode_biomehex(raw),
            Format::BitDate => mobile::decode_bitdate(raw),
            Format::BitDec => mobile::decode_bitdec(raw),
            Format::Dhcp6 => web::decode_dhcp6(raw),
            Format::Discord => web::decode_discord(raw),
            Format::Exfat => windows::decode_exfat(raw),
            Format::Fat => windows::decode_fat(raw),
            Format::GmailBoundary => web::decode_gbound(raw),
            Format::GmailMsgId => web::decode_gmsgid(raw),
            Format::Chrome => windows::decode_chrome(raw),
            Format::Eitime => web::decode_eitime(raw),
            Format::Gps => gps::decode(raw),
            Format::Gsm => mobile::decode_gsm(raw),
            Format::HfsBe => apple::decode_hfs_be(raw),
            Format::HfsLe => apple::decode_hfs_le(raw),
            Format::JulianDec => julian::decode_dec(raw),
            Format::JulianHex => julian::decode_hex(raw),
            Format::NsDate => apple::decode_nsdate(raw),
            Format::KsuidAlnum => web::decode_ksalnum(raw),
            Format::KsuidDec => web::decode_ksdec(raw),
            Format::Leb128Hex => unix::decode_leb128_hex(raw),
            Format::HfsDec => apple::decode_hfs_dec(raw),
            Format::Mastodon => web::decode_mastodon(raw),
            Format::Metasploit => web::decode_metasploit(raw),
            Format::SystemTime => windows::decode_systemtime(raw),
            Format::FileTime => windows::decode_filetime(raw),
            Format::Hotmail => windows::decode_hotmail(raw),
            Format::Dotnet => windows::decode_dotnet(raw),
            Format::Moto => mobile::decode_moto(raw),
            Format::PrTime => unix::decode_prtime(raw),
            Format::Msdos => windows::decode_msdos(raw),
            Format::Ms1904 => windows::decode_ms1904(raw),
            Format::Ns40 => mobile::decode_ns40(raw),
            Format::Ns40Le => mobile::decode_ns40le(raw),
            Format::Nokia => mobile::decode_nokia(raw),
            Format::NokiaLe => mobile::decode_nokiale(raw),
            Format::OleAuto => windows::decode_ole_auto(raw),
            Format::S32 => web::decode_s32(raw),
            Format::SemiOctet => mobile::decode_semi_octet(raw),
            Format::Sony => web::decode_sony(raw),
            Format::Symantec => mobile::decode_symantec(raw),
            Format::TikTok => web::decode_tiktok(raw),
            Format::Twitter => web::decode_twitter(raw),
            Format::UnixHexBe => unix::decode_hex32_be(raw),
            Format::UnixHexLe => unix::decode_hex32_le(raw),
            Format::UnixSec => unix::decode_sec(raw),
            Format::UnixMilli => unix::decode_milli(raw),
            Format::UnixMilliHex => unix::decode_milli_hex(raw),
            Format::Uuid => web::decode_uuid(raw),
            Format::Vmsd => web::decode_vmsd(raw),
            Format::WindowsHexBe => windows::decode_hex64_be(raw),
            Format::WindowsHexLe => windows::decode_hex64_le(raw),
            Format::Cookie => windows::decode_cookie(raw),
            Format::OleBe => windows::decode_ole_be(raw),
            Format::OleLe => windows::decode_ole_le(raw),
            Format::Mac => apple::decode_mac(raw),
            Format::Bplist => apple::decode_bplist(raw),
            Format::IosTime => apple::decode_iostime(raw),
        }
    }

    /// Encode a calendar value into this format's representation.
    ///
    /// Formats whose representation embeds non-time fields (snowflake IDs,
    /// KSUIDs, UUIDs) cannot encode and return [`crate::Error::Unsupported`].
    pub fn encode(&self, dt: &DateTime) -> Result<String> {
        match self {
            Format::ActiveDirectory => windows::encode_ad(dt),
            Format::Apache => unix::encode_apache(dt),
            Format::Biome64 => apple::encode_biome64(dt),
            Format::BiomeHex => apple::encode_biomehex(dt),
            Format::BitDate => mobile::encode_bitdate(dt),
            Format::BitDec => mobile::encode_bitdec(dt),
            Format::Dhcp6 => web::encode_dhcp6(dt),
            Format::Exfat => windows::encode_exfat(dt),
            Format::Fat => windows::encode_fat(dt),
            Format::GmailBoundary => web::encode_gbound(dt),
            Format::GmailMsgId => web::encode_gmsgid(dt),
            Format::Chrome => windows::encode_chrome(dt),
            Format::Eitime => web::encode_eitime(dt),
            Format::Gps => gps::encode(dt),
            Format::Gsm => mobile::encode_gsm(dt),
            Format::HfsBe => apple::encode_hfs_be(dt),
            Format::HfsLe => apple::encode_hfs_le(dt),
            Format::JulianDec => julian::encode_dec(dt),
            Format::JulianHex => julian::encode_hex(dt),
            Format::KsuidDec => web::encode_ksdec(dt),
            Format::Leb128Hex => unix::encode_leb128_hex(dt),
            Format::HfsDec => apple::encode_hfs_dec(dt),
            Format::Mastodon => web::encode_mastodon(dt),
            Format::SystemTime => windows::encode_systemtime(dt),
            Format::FileTime => windows::encode_filetime(dt),
            Format::Hotmail => windows::encode_hotmail(dt),
            Format::Dotnet => windows::encode_dotnet(dt),
            Format::Moto => mobile::encode_moto(dt),
            Format::PrTime => unix::encode_prtime(dt),
            Format::Msdos => windows::encode_msdos(dt),
            Format::Ms1904 => windows::encode_ms1904(dt),
            Format::Ns40 => mobile::encode_ns40(dt),
            Format::Ns40Le => mobile::encode_ns40le(dt),
            Format::Nokia => mobile::encode_nokia(dt),
            Format::NokiaLe => mobile::encode_nokiale(dt),
            Format::OleAuto => windows::encode_ole_auto(dt),
            Format::S32 => web::encode_s32(dt),
            Format::SemiOctet => mobile::encode_semi_octet(dt),
            Format::Symantec => mobile::encode_symantec(dt),
            Format::UnixHexBe => unix::encode_hex32_be(dt),
            Format::UnixHexLe => unix::encode_hex32_le(dt),
            Format::UnixSec => unix::encode_sec(dt),
            Format::UnixMilli => unix::encode_milli(dt),
            Format::UnixMilliHex => unix::encode_milli_hex(dt),
            Format::Vmsd => web::encode_vmsd(dt),
            Format::WindowsHexBe => windows::encode_hex64_be(dt),
            Format::WindowsHexLe => windows::encode_hex64_le(dt),
            Format::Cookie => windows::encode_cookie(dt),
            Format::OleBe => windows::encode_ole_be(dt),
            Format::OleLe => windows::encode_ole_le(dt),
            Format::Mac => apple::encode_mac(dt),
            Format::Bplist => apple::encode_bplist(dt),
            Format::IosTime => apple::encode_iostime(dt),
            Format::Discord
            | Format::TikTok
            | Format::Twitter
            | Format::KsuidAlnum
            | Format::Metasploit
            | Format::NsDate
            | Format::Sony
            | Format::Uuid => Err(crate::Error::Unsupported { what: "encoding" }),
        }
    }
}
