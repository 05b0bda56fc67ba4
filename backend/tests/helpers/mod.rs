#![allow(dead_code)]

use std::fs;
use std::path::Path;

use encoding_rs::EUC_KR;

pub const SAMPLE_TEXT: &str = "\
창1:1 <천지 창조> 태초에 하나님이 천지를 창조하시니라
창1:2 땅이 혼돈하고 공허하며 흑암이 깊음 위에 있고 하나님의 영은 수면 위에 운행하시니라
창1:3 하나님이 이르시되 빛이 있으라 하시니 빛이 있었고

출1:1 야곱과 함께 각각 자기 가족을 데리고 애굽에 이른 이스라엘 아들들의 이름은 이러하니
이 줄은 구절이 아닙니다
가1:1 없는 책
요1:1 태초에 말씀이 계시니라 이 말씀이 하나님과 함께 계셨으니 이 말씀은 곧 하나님이시니라
요일1:1 태초부터 있는 생명의 말씀에 관하여는 우리가 들은 바요
";

pub const SAMPLE_SOURCE: &str = r#"{
  "info": {"name": "현대인의성경"},
  "book": {
    "1": {
      "info": {"name": "창세기"},
      "chapter": {
        "1": {"verse": {
          "1": {"text": " 태초에 하나님이 하늘과 땅을 창조하셨다. "},
          "2": {"text": "땅은 아무 형태도 없이 텅 비어 "}
        }}
      }
    },
    "43": {
      "info": {"name": "요한복음"},
      "chapter": {"3": {"verse": {"16": {"text": "하나님이 세상을 이처럼 사랑하셔서"}}}}
    }
  }
}"#;

/// Writes `text` encoded as CP949 / EUC-KR, with Windows line endings.
pub fn write_cp949(path: &Path, text: &str) {
    let crlf = text.replace('\n', "\r\n");
    let (bytes, _, had_errors) = EUC_KR.encode(&crlf);
    assert!(!had_errors, "sample text must be representable in EUC-KR");
    fs::write(path, bytes).unwrap();
}
