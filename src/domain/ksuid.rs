// KSUID（K-Sortable Unique IDentifier）
//
// 生成はsvix-ksuidに委譲する。文字列表現は27文字のbase62で、
// 生成秒の順に辞書順ソートできる。

use svix_ksuid::{Ksuid, KsuidLike};

/// 文字列表現の長さ
pub const KSUID_STRING_LENGTH: usize = 27;

/// 現在時刻と乱数ペイロードから新しいKSUID文字列を生成
pub fn new_ksuid() -> String {
    Ksuid::new(None, None).to_string()
}

/// 文字列の末尾27文字がASCII単語文字（英数字とアンダースコア）かどうかを判定
///
/// 正規表現`\w{27}$`（ASCIIの`\w`）と同じ判定。末尾さえ条件を満たせば、
/// それより前に任意の文字があっても受け入れる。
pub fn has_ksuid_suffix(value: &str) -> bool {
    let bytes = value.as_bytes();

    if bytes.len() < KSUID_STRING_LENGTH {
        return false;
    }

    // マルチバイト文字の各バイトは0x80以上なので単語文字にならない
    bytes[bytes.len() - KSUID_STRING_LENGTH..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}
